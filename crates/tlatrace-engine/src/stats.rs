//! Per-file and process-wide simulation statistics.
//!
//! Workers build one [`PartialStats`] per trace file; the coordinator folds
//! them into a single [`AggregateStats`]. When two traces reach the same state
//! through different actions, the action recorded for that state is whichever
//! was merged first.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tlatrace_types::{CanonicalDigest, State};

/// Statistics of a single trace file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialStats {
    pub file: PathBuf,
    /// First action seen for each distinct state
    pub states: HashMap<CanonicalDigest, Option<String>>,
    pub total_states: u64,
    /// Number of states in the trace
    pub diameter: usize,
    pub total_actions: BTreeMap<String, u64>,
}

impl PartialStats {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Account for the next state of the trace
    pub fn record(&mut self, state: &State) {
        self.diameter += 1;
        self.total_states += 1;

        let action = state.action().map(str::to_string);
        if let Some(name) = &action {
            *self.total_actions.entry(name.clone()).or_default() += 1;
        }
        self.states.entry(state.digest()).or_insert(action);
    }

    pub fn from_states<'a>(file: impl Into<PathBuf>, states: impl IntoIterator<Item = &'a State>) -> Self {
        let mut stats = Self::new(file);
        for state in states {
            stats.record(state);
        }
        stats
    }
}

/// Statistics of everything merged so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    processed: HashSet<PathBuf>,
    total_states: u64,
    states: HashMap<CanonicalDigest, Option<String>>,
    diameters: BTreeMap<usize, u64>,
    total_actions: BTreeMap<String, u64>,
    distinct_actions: BTreeMap<String, u64>,
    failed: u64,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, partial: PartialStats) {
        self.processed.insert(partial.file);
        self.total_states += partial.total_states;
        for (digest, action) in partial.states {
            self.states.entry(digest).or_insert(action);
        }
        if partial.diameter > 0 {
            *self.diameters.entry(partial.diameter).or_default() += 1;
        }
        for (action, count) in partial.total_actions {
            *self.total_actions.entry(action).or_default() += count;
        }
    }

    /// Fold another aggregate into this one; entries already here win.
    pub fn combine(&mut self, other: AggregateStats) {
        self.processed.extend(other.processed);
        self.total_states += other.total_states;
        for (digest, action) in other.states {
            if let Entry::Vacant(slot) = self.states.entry(digest) {
                slot.insert(action);
            }
        }
        for (diameter, count) in other.diameters {
            *self.diameters.entry(diameter).or_default() += count;
        }
        for (action, count) in other.total_actions {
            *self.total_actions.entry(action).or_default() += count;
        }
        self.failed += other.failed;
    }

    /// A file whose job failed; it stays out of every other counter
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Count distinct states per action. Run once, after the last merge.
    pub fn finalize(&mut self) {
        self.distinct_actions.clear();
        for action in self.states.values().flatten() {
            *self.distinct_actions.entry(action.clone()).or_default() += 1;
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.len() as u64
    }

    pub fn is_processed(&self, file: &Path) -> bool {
        self.processed.contains(file)
    }

    pub fn total_states(&self) -> u64 {
        self.total_states
    }

    pub fn distinct_states(&self) -> u64 {
        self.states.len() as u64
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Trace length -> number of traces
    pub fn diameters(&self) -> &BTreeMap<usize, u64> {
        &self.diameters
    }

    pub fn total_actions(&self) -> &BTreeMap<String, u64> {
        &self.total_actions
    }

    /// Distinct states first reached by each action; empty before [`AggregateStats::finalize`]
    pub fn distinct_actions(&self) -> &BTreeMap<String, u64> {
        &self.distinct_actions
    }

    /// First recorded action for a state
    pub fn action_of(&self, digest: &CanonicalDigest) -> Option<&str> {
        self.states.get(digest).and_then(|a| a.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlatrace_types::Value;

    fn state(big: i64, small: i64, action: &str) -> State {
        State::new()
            .with_var("big", Value::Int(big))
            .with_var("small", Value::Int(small))
            .with_action(action)
    }

    fn partials() -> Vec<PartialStats> {
        vec![
            PartialStats::from_states(
                "trace_1",
                &[state(0, 0, "Init"), state(5, 0, "FillBig"), state(2, 3, "BigToSmall")],
            ),
            PartialStats::from_states("trace_2", &[state(0, 0, "Init"), state(0, 3, "FillSmall")]),
            PartialStats::from_states(
                "trace_3",
                &[state(0, 0, "Init"), state(5, 0, "Pour"), state(0, 3, "FillSmall")],
            ),
            PartialStats::from_states("trace_4", &[]),
        ]
    }

    #[test]
    fn test_partial_counts() {
        let p = &partials()[0];
        assert_eq!(p.diameter, 3);
        assert_eq!(p.total_states, 3);
        assert_eq!(p.states.len(), 3);
        assert_eq!(p.total_actions.get("FillBig"), Some(&1));
    }

    #[test]
    fn test_merge_counts_and_histograms() {
        let mut agg = AggregateStats::new();
        for p in partials() {
            agg.merge(p);
        }
        agg.finalize();

        assert_eq!(agg.processed(), 4);
        assert_eq!(agg.total_states(), 8);
        assert_eq!(agg.distinct_states(), 4);
        assert_eq!(agg.diameters().get(&3), Some(&2));
        assert_eq!(agg.diameters().get(&2), Some(&1));
        assert_eq!(agg.diameters().get(&0), None);
        assert_eq!(agg.total_actions().get("Init"), Some(&3));
        assert_eq!(agg.distinct_actions().get("Init"), Some(&1));
    }

    #[test]
    fn test_first_writer_wins() {
        let mut agg = AggregateStats::new();
        for p in partials() {
            agg.merge(p);
        }
        agg.finalize();

        // (5, 0) was reached by FillBig in trace_1 before Pour in trace_3
        let digest = state(5, 0, "x").digest();
        assert_eq!(agg.action_of(&digest), Some("FillBig"));
        assert_eq!(agg.distinct_actions().get("Pour"), None);
        assert_eq!(agg.total_actions().get("Pour"), Some(&1));
    }

    #[test]
    fn test_merge_is_additive() {
        let mut whole = AggregateStats::new();
        for p in partials() {
            whole.merge(p);
        }

        let mut parts = partials().into_iter();
        let mut left = AggregateStats::new();
        let mut right = AggregateStats::new();
        for p in parts.by_ref().take(2) {
            left.merge(p);
        }
        for p in parts {
            right.merge(p);
        }
        left.combine(right);

        whole.finalize();
        left.finalize();
        assert_eq!(whole, left);
    }

    #[test]
    fn test_failures_do_not_count_as_processed() {
        let mut agg = AggregateStats::new();
        agg.record_failure();
        agg.merge(PartialStats::from_states("trace_1", &[state(1, 1, "A")]));
        assert_eq!(agg.failed(), 1);
        assert_eq!(agg.processed(), 1);
        assert!(agg.is_processed(Path::new("trace_1")));
    }
}
