use crate::Result;
use crate::ops::summary::{SummaryProgress, SummaryService};
use crate::scan::scan_traces;
use notify::{Event, PollWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::Duration;
use tlatrace_engine::AggregateStats;

const DEFAULT_POLL: Duration = Duration::from_millis(500);

/// Simulation summary over a directory that is still being written.
///
/// Each new trace file is submitted as soon as the watcher reports it. Once
/// the finish file shows up nothing else is expected: the remaining jobs are
/// drained and the final report is produced.
pub struct WatchService {
    summary: SummaryService,
    poll_interval: Duration,
}

impl WatchService {
    pub fn new(summary: SummaryService) -> Self {
        Self {
            summary,
            poll_interval: DEFAULT_POLL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn run<F>(&self, trace_dir: &Path, mut on_progress: F) -> Result<AggregateStats>
    where
        F: FnMut(SummaryProgress),
    {
        let (tx, rx) = channel::<Event>();
        let config = notify::Config::default().with_poll_interval(self.poll_interval);
        let mut watcher = PollWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            config,
        )?;
        watcher.watch(trace_dir, RecursiveMode::NonRecursive)?;
        log::debug!("watching {}", trace_dir.display());

        let filter = self.summary.filter();
        let shutdown = self.summary.shutdown();
        let mut coordinator = self.summary.coordinator()?;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut finished = false;

        while !shutdown.is_requested() {
            for path in scan_traces(trace_dir, filter)? {
                if seen.insert(path.clone()) {
                    finished |= filter.is_finish_file(&path);
                    coordinator.submit(path);
                }
            }
            if finished {
                break;
            }

            // Wake on the next file system event, merging results meanwhile
            match rx.recv_timeout(self.poll_interval) {
                Ok(event) => log::trace!("watch event: {:?}", event.kind),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            while rx.try_recv().is_ok() {}
            coordinator.poll_ready(&mut on_progress);
        }
        drop(watcher);

        on_progress(SummaryProgress::Submitted {
            files: coordinator.submitted(),
        });
        coordinator.drain(shutdown, &mut on_progress);
        Ok(coordinator.finish(&mut on_progress))
    }
}
