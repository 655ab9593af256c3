//! Interrupt handling shared by the coordinator loops.
//!
//! The first interrupt asks the coordinator to stop submitting and drain what
//! is running; the second exits the process with status 130.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    interrupts: Arc<AtomicUsize>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a Ctrl-C handler feeding this counter. Only one handler may
    /// exist per process.
    pub fn install_ctrlc_handler(&self) -> crate::Result<()> {
        let shutdown = self.clone();
        ctrlc::set_handler(move || {
            if shutdown.interrupt() >= 2 {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            eprintln!("Interrupted, finishing running jobs (press Ctrl-C again to exit now)");
        })
        .map_err(std::io::Error::other)?;
        Ok(())
    }

    /// Record one interrupt, returning how many have been seen
    pub fn interrupt(&self) -> usize {
        self.interrupts.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_requested(&self) -> bool {
        self.interrupts.load(Ordering::SeqCst) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupts_are_shared_between_clones() {
        let shutdown = Shutdown::new();
        let handle = shutdown.clone();
        assert!(!shutdown.is_requested());
        assert_eq!(handle.interrupt(), 1);
        assert!(shutdown.is_requested());
        assert_eq!(shutdown.interrupt(), 2);
    }
}
