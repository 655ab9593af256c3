// Runtime module - files, workers and progress around the engine
// Every long operation takes an `on_progress` callback; printing is the caller's job

pub mod config;
pub mod error;
pub mod ops;
pub mod pool;
pub mod scan;
pub mod shutdown;

pub use config::{Config, resolve_config_path};
pub use error::{Error, Result};
pub use ops::{
    CountProgress, CountService, Dispatcher, PathsProgress, PathsService, SummaryMapper,
    SummaryProgress, SummaryService, WatchService,
};
pub use pool::{JobError, TaskGroup};
pub use scan::{TraceFilter, scan_traces};
pub use shutdown::Shutdown;
