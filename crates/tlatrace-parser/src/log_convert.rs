//! Recovery of trace text from raw TLC console output.
//!
//! [`LogToTrace`] wraps a line iterator over a TLC log (the usual `MC.out`) and
//! yields the lines of an equivalent trace file: a module header, one
//! `STATE_n ==` marker per reported state (preceded by an action annotation when
//! TLC printed one), the conjunct lines, and a module footer. Lines the
//! converter does not recognize are dropped.

use crate::format;
use std::collections::VecDeque;
use std::io;

const START_MESSAGE: &str = "The behavior up to this point is:";
const ERROR_PREFIX: &str = "Error: ";
const END_MESSAGES: [&str; 2] = ["Progress", "The number of states generated:"];
const TRACE_MODULE: &str = "MC_trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the first line to tell `-tool` output from plain output
    Detect,
    /// Skipping everything before the error trace
    SeekStart,
    Body,
    Finished,
}

pub struct LogToTrace<I> {
    lines: I,
    phase: Phase,
    start_message: String,
    footer: String,
    states: usize,
    pending: VecDeque<String>,
}

impl<I> LogToTrace<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            phase: Phase::Detect,
            start_message: String::new(),
            footer: String::new(),
            states: 0,
            pending: VecDeque::new(),
        }
    }

    /// Number of state markers emitted so far
    pub fn states(&self) -> usize {
        self.states
    }

    fn feed(&mut self, line: &str) {
        match self.phase {
            Phase::Detect => {
                // TLC started with -tool prefixes every message block with '@'
                self.start_message = if line.starts_with('@') {
                    START_MESSAGE.to_string()
                } else {
                    format!("{}{}", ERROR_PREFIX, START_MESSAGE)
                };
                self.phase = Phase::SeekStart;
            }
            Phase::SeekStart => {
                if line.starts_with(&self.start_message) {
                    let header = format::module_header(TRACE_MODULE);
                    self.footer = format::module_footer(header.len());
                    self.pending.push_back(header);
                    self.phase = Phase::Body;
                }
            }
            Phase::Body => self.body_line(line),
            Phase::Finished => {}
        }
    }

    fn body_line(&mut self, line: &str) {
        if line.starts_with('/') || line.starts_with(' ') {
            self.pending.push_back(line.to_string());
        } else if line.starts_with("State") || line.starts_with(|c: char| c.is_ascii_digit()) {
            self.states += 1;
            if let Some(action) = format::parse_action(line) {
                self.pending.push_back(format::action_annotation(action));
            }
            self.pending.push_back(format::state_marker(self.states));
        } else if line.is_empty() {
            self.pending.push_back(String::new());
        } else if END_MESSAGES.iter().any(|m| line.starts_with(m)) {
            self.finish();
        } else {
            log::trace!("skipping log line: {}", line);
        }
    }

    fn finish(&mut self) {
        if self.phase == Phase::Body {
            self.pending.push_back(std::mem::take(&mut self.footer));
        }
        self.phase = Phase::Finished;
    }
}

impl<I> Iterator for LogToTrace<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            if self.phase == Phase::Finished {
                return None;
            }
            match self.lines.next() {
                Some(Ok(line)) => self.feed(line.trim_end_matches('\r')),
                Some(Err(err)) => {
                    self.phase = Phase::Finished;
                    return Some(Err(err));
                }
                // A log cut short still yields a well-formed trace
                None => self.finish(),
            }
        }
    }
}
