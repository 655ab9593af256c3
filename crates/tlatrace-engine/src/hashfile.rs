//! The persisted hash file of the two-phase count.
//!
//! Producers append one line per processed trace: the space-separated
//! 16-hex-digit digest of every state in the trace. An empty trace yields an
//! empty line. A later reduce pass reads the file back and counts unique
//! traces and distinct states.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use tlatrace_types::{CanonicalDigest, TraceDigest, trace_digest};

pub fn format_line(digests: &[CanonicalDigest]) -> String {
    digests
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_line(text: &str, line: usize) -> Result<Vec<CanonicalDigest>> {
    text.split_whitespace()
        .map(|token| {
            if token.len() != 16 {
                return Err(Error::HashFile {
                    line,
                    message: format!("expected 16 hex digits, got '{}'", token),
                });
            }
            token.parse().map_err(|_| Error::HashFile {
                line,
                message: format!("not a hex digest: '{}'", token),
            })
        })
        .collect()
}

/// Append-only writer; owned by the coordinator
pub struct HashFileWriter<W: Write> {
    out: W,
    lines: u64,
}

impl<W: Write> HashFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn append(&mut self, digests: &[CanonicalDigest]) -> Result<()> {
        writeln!(self.out, "{}", format_line(digests))?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Counters after some number of reduced lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountTotals {
    pub unique_traces: u64,
    pub processed: u64,
    pub distinct_states: u64,
    pub total_states: u64,
}

#[derive(Debug, Default)]
pub struct HashFileReducer {
    traces: HashSet<TraceDigest>,
    states: HashSet<CanonicalDigest>,
    processed: u64,
    total_states: u64,
}

impl HashFileReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one trace given as its state digests
    pub fn add(&mut self, digests: &[CanonicalDigest]) {
        self.processed += 1;
        self.total_states += digests.len() as u64;
        self.traces.insert(trace_digest(digests));
        self.states.extend(digests.iter().copied());
    }

    pub fn add_line(&mut self, text: &str, line: usize) -> Result<()> {
        let digests = parse_line(text, line)?;
        self.add(&digests);
        Ok(())
    }

    /// Reduce a whole hash file, calling `on_line` after every line
    pub fn reduce<R, F>(&mut self, reader: R, mut on_line: F) -> Result<CountTotals>
    where
        R: BufRead,
        F: FnMut(CountTotals),
    {
        for (idx, text) in reader.lines().enumerate() {
            let text = text?;
            self.add_line(&text, idx + 1)?;
            on_line(self.totals());
        }
        Ok(self.totals())
    }

    pub fn totals(&self) -> CountTotals {
        CountTotals {
            unique_traces: self.traces.len() as u64,
            processed: self.processed,
            distinct_states: self.states.len() as u64,
            total_states: self.total_states,
        }
    }
}
