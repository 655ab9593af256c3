use std::time::{Duration, Instant};

/// Decides when the coordinator prints a progress line.
///
/// Time-based by default: at most one report per `period`, the first one
/// immediately. With `every_n > 0`, completions report whenever the processed
/// count is a multiple of `every_n`; idle ticks stay time-based.
#[derive(Debug, Clone)]
pub struct ProgressGate {
    period: Duration,
    every_n: u64,
    last: Option<Instant>,
}

impl ProgressGate {
    pub fn new(period: Duration, every_n: u64) -> Self {
        Self {
            period,
            every_n,
            last: None,
        }
    }

    /// Poll with nothing new completed
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// A job completed, bringing the processed count to `processed`
    pub fn completed(&mut self, processed: u64) -> bool {
        self.completed_at(processed, Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.period,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn completed_at(&mut self, processed: u64, now: Instant) -> bool {
        if self.every_n == 0 {
            return self.tick_at(now);
        }
        if processed % self.every_n == 0 {
            self.last = Some(now);
            return true;
        }
        false
    }
}

/// `part / whole` as a percentage with three significant digits, `0` when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0".to_string();
    }
    significant(part as f64 * 100.0 / whole as f64)
}

fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_gate() {
        let mut gate = ProgressGate::new(Duration::from_secs(5), 0);
        let t0 = Instant::now();
        assert!(gate.tick_at(t0));
        assert!(!gate.tick_at(t0 + Duration::from_secs(1)));
        assert!(!gate.completed_at(3, t0 + Duration::from_secs(4)));
        assert!(gate.completed_at(4, t0 + Duration::from_secs(5)));
        assert!(!gate.tick_at(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_every_n_gate() {
        let mut gate = ProgressGate::new(Duration::from_secs(3600), 10);
        let t0 = Instant::now();
        assert!(!gate.completed_at(9, t0));
        assert!(gate.completed_at(10, t0));
        assert!(!gate.completed_at(11, t0));
        assert!(gate.completed_at(20, t0));
        // idle ticks still honour the period
        assert!(!gate.tick_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), "0");
        assert_eq!(percent(0, 5), "0");
        assert_eq!(percent(7, 10), "70");
        assert_eq!(percent(2, 3), "66.7");
        assert_eq!(percent(10, 10), "100");
        assert_eq!(percent(1, 200), "0.5");
        assert_eq!(percent(1, 3000), "0.0333");
    }
}
