// Engine module - pure aggregation over decoded traces
// Sits between the parser (text -> states) and the runtime (files, workers, progress)

pub mod error;
pub mod hashfile;
pub mod paths;
pub mod progress;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
pub use hashfile::{CountTotals, HashFileReducer, HashFileWriter};
pub use paths::{SimplePaths, StateGraph, trace_file_name};
pub use progress::{ProgressGate, percent};
pub use report::{CountLine, PathsLine, SummaryLine, SummaryReport};
pub use stats::{AggregateStats, PartialStats};
