//! Text-level readers for TLC output.
//!
//! - [`decoder`]: value literals (`{..}`, `<<..>>`, `[..]`, `(..)`, scalars)
//! - [`reader`]: streaming trace reader yielding one canonical [`State`] per step
//! - [`log_convert`]: raw TLC log output to trace-file text, applied automatically
//! - [`dot`]: state graphs dumped with `-dump dot`

pub mod decoder;
pub mod dot;
pub mod error;
pub mod format;
pub mod hooks;
pub mod log_convert;
pub mod reader;
mod scanner;

pub use decoder::{Decoder, DecoderOptions, decode};
pub use dot::{DotEdge, DotGraph, NodeId, read_dot, read_dot_file};
pub use error::{DecodeError, Error, ReadError, Result};
pub use hooks::{EntryHook, RenameVariables, VariableHook};
pub use log_convert::LogToTrace;
pub use reader::{ReaderOptions, TraceReader, read_trace};
pub use scanner::Delimiter;

pub use tlatrace_types::{State, Value};
