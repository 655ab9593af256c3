//! Streaming reader over trace files.
//!
//! A trace file is a TLA+ module whose body is a series of `STATE_n ==`
//! definitions, each a conjunction of `/\ var = value` lines:
//!
//! ```text
//! ---------------- MODULE MC_trace ----------------
//! \* <Initial predicate>
//! STATE_1 ==
//! /\ big = 0
//! /\ small = 0
//!
//! \* <FillBig line 20, col 12 to line 21, col 30 of module DieHard>
//! STATE_2 ==
//! /\ big = 5
//! /\ small = 0
//!
//! =================================================
//! ```
//!
//! Input that does not start with `--` is taken to be raw TLC output and is
//! converted on the fly by [`LogToTrace`].

use crate::decoder::{Decoder, DecoderOptions};
use crate::error::ReadError;
use crate::format::{self, ACTION_MARKER, CONJUNCT_MARKER, TRACE_MARKER};
use crate::hooks::VariableHook;
use crate::log_convert::LogToTrace;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::{Chain, Once};
use std::path::Path;
use std::sync::Arc;
use tlatrace_types::State;

/// Everything a reader needs besides its input
#[derive(Clone)]
pub struct ReaderOptions {
    pub decoder: DecoderOptions,
    pub variable_hook: Option<Arc<dyn VariableHook>>,
    /// Tag each state with the action named in the preceding annotation
    pub track_actions: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            decoder: DecoderOptions::default(),
            variable_hook: None,
            track_actions: true,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder(mut self, decoder: DecoderOptions) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_variable_hook(mut self, hook: impl VariableHook + 'static) -> Self {
        self.variable_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_actions(mut self, track: bool) -> Self {
        self.track_actions = track;
        self
    }
}

impl fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("decoder", &self.decoder)
            .field("variable_hook", &self.variable_hook.is_some())
            .field("track_actions", &self.track_actions)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Before the module header or first state marker
    Preamble,
    AwaitingStateMarker,
    AccumulatingVariable,
    Done,
}

type Replayed<R> = Chain<Once<io::Result<String>>, io::Lines<R>>;

enum Source<R> {
    /// First line not read yet, so the input kind is unknown
    Unresolved(io::Lines<R>),
    Trace(Replayed<R>),
    Log(LogToTrace<Replayed<R>>),
    Exhausted,
}

impl<R: BufRead> Source<R> {
    fn next_line(&mut self) -> Option<io::Result<String>> {
        if matches!(self, Source::Unresolved(_)) {
            let Source::Unresolved(mut lines) = std::mem::replace(self, Source::Exhausted) else {
                return None;
            };
            let first = match lines.next()? {
                Ok(first) => first,
                Err(err) => return Some(Err(err)),
            };
            let is_trace = first.starts_with(TRACE_MARKER);
            let replayed = std::iter::once(Ok(first)).chain(lines);
            *self = if is_trace {
                Source::Trace(replayed)
            } else {
                log::debug!("input is not a trace file, converting from TLC log output");
                Source::Log(LogToTrace::new(replayed))
            };
        }

        match self {
            Source::Trace(lines) => lines.next(),
            Source::Log(lines) => lines.next(),
            Source::Unresolved(_) | Source::Exhausted => None,
        }
    }
}

enum Line<'l> {
    Blank,
    /// `-` line: module header or separator
    Header,
    /// `=` line: module footer
    Footer,
    Marker,
    Annotation,
    Assignment(&'l str),
    Continuation(&'l str),
    Other,
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if line.starts_with(CONJUNCT_MARKER) {
        return Line::Assignment(line[CONJUNCT_MARKER.len()..].trim());
    }
    if line.starts_with(ACTION_MARKER) {
        return Line::Annotation;
    }
    if line.starts_with("STATE") || line.starts_with("State") {
        return Line::Marker;
    }
    match line.chars().next() {
        Some('-') => Line::Header,
        Some('=') => Line::Footer,
        Some(c) if c.is_ascii_digit() => Line::Marker,
        Some(c) if c.is_whitespace() => Line::Continuation(line.trim()),
        _ => Line::Other,
    }
}

/// Iterator over the states of one trace.
///
/// States come out canonicalized, in file order. After the first error the
/// iterator is finished.
pub struct TraceReader<R> {
    source: Source<R>,
    options: Arc<ReaderOptions>,
    phase: Phase,
    line_no: usize,
    state: State,
    /// Action from the last annotation, waiting for its state marker
    pending_action: Option<String>,
    /// Assignment being accumulated: starting line and text after `/\`
    variable: Option<(usize, String)>,
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, options: impl Into<Arc<ReaderOptions>>) -> Result<Self, ReadError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), options))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R, options: impl Into<Arc<ReaderOptions>>) -> Self {
        Self {
            source: Source::Unresolved(reader.lines()),
            options: options.into(),
            phase: Phase::Preamble,
            line_no: 0,
            state: State::new(),
            pending_action: None,
            variable: None,
        }
    }

    /// Lines consumed so far (after log conversion, when it applies)
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn feed(&mut self, line: &str) -> Result<Option<State>, ReadError> {
        match classify(line) {
            Line::Assignment(text) => {
                self.flush_variable()?;
                self.variable = Some((self.line_no, text.to_string()));
                self.phase = Phase::AccumulatingVariable;
                Ok(None)
            }
            Line::Continuation(text) => {
                match (&mut self.variable, self.phase) {
                    (Some((_, acc)), Phase::AccumulatingVariable) => {
                        acc.push(' ');
                        acc.push_str(text);
                    }
                    _ => log::debug!("line {}: stray continuation ignored", self.line_no),
                }
                Ok(None)
            }
            Line::Blank => {
                self.flush_variable()?;
                if self.phase == Phase::AccumulatingVariable {
                    self.phase = Phase::AwaitingStateMarker;
                }
                Ok(None)
            }
            Line::Annotation => {
                self.flush_variable()?;
                self.pending_action = format::parse_action(line).map(str::to_string);
                Ok(None)
            }
            Line::Marker => {
                let finished = self.finish_state()?;
                let annotated = self.pending_action.take();
                if self.options.track_actions {
                    let action = annotated.or_else(|| format::parse_action(line).map(str::to_string));
                    self.state.set_action(action);
                }
                self.phase = Phase::AwaitingStateMarker;
                Ok(finished)
            }
            Line::Header => {
                let finished = self.finish_state()?;
                self.pending_action = None;
                self.phase = Phase::AwaitingStateMarker;
                Ok(finished)
            }
            Line::Footer => {
                let finished = self.finish_state()?;
                self.phase = Phase::Done;
                Ok(finished)
            }
            Line::Other => {
                log::debug!("line {}: unrecognized line ignored", self.line_no);
                Ok(None)
            }
        }
    }

    /// Decode the accumulated assignment into the current state
    fn flush_variable(&mut self) -> Result<(), ReadError> {
        let Some((line, text)) = self.variable.take() else {
            return Ok(());
        };
        let Some((name, literal)) = text.split_once('=') else {
            return Err(ReadError::MalformedAssignment { line, text });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ReadError::MalformedAssignment { line, text });
        }

        let value = Decoder::new(&self.options.decoder)
            .decode(literal)
            .map_err(|source| ReadError::Decode {
                line,
                variable: name.to_string(),
                source,
            })?;
        let (name, value) = match &self.options.variable_hook {
            Some(hook) => hook.rewrite(name.to_string(), value),
            None => (name.to_string(), value),
        };
        self.state.insert(name, value);
        Ok(())
    }

    /// Close the current state; empty states are dropped
    fn finish_state(&mut self) -> Result<Option<State>, ReadError> {
        self.flush_variable()?;
        let state = std::mem::take(&mut self.state);
        Ok((!state.is_empty()).then(|| state.canonicalize()))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<State, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.phase != Phase::Done {
            let line = match self.source.next_line() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.phase = Phase::Done;
                    return Some(Err(err.into()));
                }
                None => {
                    self.phase = Phase::Done;
                    return self.finish_state().transpose();
                }
            };
            self.line_no += 1;

            match self.feed(line.trim_end_matches('\r')) {
                Ok(Some(state)) => return Some(Ok(state)),
                Ok(None) => {}
                Err(err) => {
                    self.phase = Phase::Done;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

/// Read every state of the trace at `path`.
pub fn read_trace(path: impl AsRef<Path>, options: impl Into<Arc<ReaderOptions>>) -> Result<Vec<State>, ReadError> {
    TraceReader::open(path, options)?.collect()
}
