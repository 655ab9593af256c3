//! Text form of progress and final reports.

use crate::progress::percent;
use crate::stats::AggregateStats;
use std::collections::BTreeMap;
use std::fmt;

/// One progress line of a simulation summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLine {
    pub processed: u64,
    pub submitted: u64,
    pub distinct_states: u64,
    pub total_states: u64,
    pub failed: u64,
}

impl SummaryLine {
    pub fn new(stats: &AggregateStats, submitted: u64) -> Self {
        Self {
            processed: stats.processed(),
            submitted,
            distinct_states: stats.distinct_states(),
            total_states: stats.total_states(),
            failed: stats.failed(),
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed: {}/{} ({}%), distinct/total states: {}/{} ({}%)",
            self.processed,
            self.submitted,
            percent(self.processed, self.submitted),
            self.distinct_states,
            self.total_states,
            percent(self.distinct_states, self.total_states)
        )?;
        if self.failed > 0 {
            write!(f, ", failed: {}", self.failed)?;
        }
        Ok(())
    }
}

/// Final report: the last progress line plus both histograms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub line: SummaryLine,
    pub diameters: BTreeMap<usize, u64>,
    /// Action -> (distinct, total)
    pub actions: BTreeMap<String, (u64, u64)>,
}

impl SummaryReport {
    /// Build from finalized stats
    pub fn new(stats: &AggregateStats, submitted: u64) -> Self {
        let actions = stats
            .total_actions()
            .iter()
            .map(|(name, total)| {
                let distinct = stats.distinct_actions().get(name).copied().unwrap_or(0);
                (name.clone(), (distinct, *total))
            })
            .collect();
        Self {
            line: SummaryLine::new(stats, submitted),
            diameters: stats.diameters().clone(),
            actions,
        }
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.line)?;
        writeln!(f, "Diameters:")?;
        for (diameter, count) in &self.diameters {
            writeln!(f, "  {} : {}", diameter, count)?;
        }
        write!(f, "Actions:")?;
        for (name, (distinct, total)) in &self.actions {
            write!(f, "\n  {} : {} / {}", name, distinct, total)?;
        }
        Ok(())
    }
}

/// Progress of the two-phase unique trace / distinct state count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLine {
    /// Producing: traces hashed so far
    Producing { processed: u64, submitted: u64 },
    Reducing {
        unique_traces: u64,
        processed: u64,
        submitted: u64,
        distinct_states: u64,
        total_states: u64,
    },
}

impl fmt::Display for CountLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CountLine::Producing {
                processed,
                submitted,
            } => write!(
                f,
                "processed/total traces: {}/{} ({}%)",
                processed,
                submitted,
                percent(processed, submitted)
            ),
            CountLine::Reducing {
                unique_traces,
                processed,
                submitted,
                distinct_states,
                total_states,
            } => write!(
                f,
                "unique/processed/total traces: {}/{}/{} ({}% {}%), distinct/total states: {}/{} ({}%)",
                unique_traces,
                processed,
                submitted,
                percent(unique_traces, processed),
                percent(processed, submitted),
                distinct_states,
                total_states,
                percent(distinct_states, total_states)
            ),
        }
    }
}

/// Progress of path enumeration over (root, leaf) pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathsLine {
    pub processed: u64,
    pub submitted: u64,
    pub all: u64,
    pub paths: u64,
}

impl fmt::Display for PathsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed/submitted/all: {}/{}/{} ({}%), all paths: {}",
            self.processed,
            self.submitted,
            self.all,
            percent(self.processed, self.all),
            self.paths
        )
    }
}
