//! Testing infrastructure for tlatrace integration tests.
//!
//! - `TestWorld`: isolated trace directory plus a configured CLI invocation
//! - `fixtures`: sample traces, TLC logs and DOT graphs, and a trace renderer
//! - `assertions`: checks over the CLI's report and JSON output
//! - `process`: background processes for `watch`

pub mod assertions;
pub mod fixtures;
pub mod process;
pub mod world;

pub use fixtures::{SampleFiles, TraceBuilder};
pub use world::{CliResult, TestWorld};
