use std::fmt;

/// Result type for tlatrace-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Trace file could not be read or decoded
    Read(tlatrace_parser::ReadError),

    /// Aggregation or hash-file layer error
    Engine(tlatrace_engine::Error),

    /// State graph could not be parsed
    Parser(tlatrace_parser::Error),

    /// Configuration error
    Config(String),

    /// File watcher failed
    Watch(notify::Error),

    /// Worker job panicked
    Job(crate::pool::JobError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Read(err) => write!(f, "Trace error: {}", err),
            Error::Engine(err) => write!(f, "Engine error: {}", err),
            Error::Parser(err) => write!(f, "Parse error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Watch(err) => write!(f, "Watch error: {}", err),
            Error::Job(err) => write!(f, "Job error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Read(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Parser(err) => Some(err),
            Error::Watch(err) => Some(err),
            Error::Job(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<tlatrace_parser::ReadError> for Error {
    fn from(err: tlatrace_parser::ReadError) -> Self {
        Error::Read(err)
    }
}

impl From<tlatrace_engine::Error> for Error {
    fn from(err: tlatrace_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<tlatrace_parser::Error> for Error {
    fn from(err: tlatrace_parser::Error) -> Self {
        Error::Parser(err)
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err)
    }
}

impl From<crate::pool::JobError> for Error {
    fn from(err: crate::pool::JobError) -> Self {
        Error::Job(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
