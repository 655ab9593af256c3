use std::fmt;
use tlatrace_parser::NodeId;

/// Result type for tlatrace-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Hash file line that is not a list of hex digests
    HashFile { line: usize, message: String },

    /// Path refers to a node the graph has no label for
    UnknownNode(NodeId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::HashFile { line, message } => {
                write!(f, "Hash file error at line {}: {}", line, message)
            }
            Error::UnknownNode(id) => write!(f, "Unknown state graph node: {}", id),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::HashFile { .. } | Error::UnknownNode(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
