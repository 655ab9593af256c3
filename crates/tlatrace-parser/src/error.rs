use std::fmt;

/// Result type for tlatrace-parser operations that are not value decoding
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed value literal. Decoding never recovers from these.
///
/// Offsets are byte offsets within the literal handed to the decoder call that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing to decode (empty literal or empty container element)
    Empty,

    /// Opening delimiter without a matching close
    Unmatched { open: &'static str, offset: usize },

    /// Close delimiter of the wrong kind
    Mismatched {
        expected: &'static str,
        found: &'static str,
        offset: usize,
    },

    /// Close delimiter with nothing open
    UnexpectedClose { close: &'static str, offset: usize },

    /// String literal missing its closing quote
    UnterminatedString { offset: usize },

    /// Text after a complete literal
    TrailingInput { offset: usize },

    /// Record or function entry without its `|->` / `:>`
    MissingArrow { arrow: &'static str, entry: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty value"),
            DecodeError::Unmatched { open, offset } => {
                write!(f, "unmatched '{}' at offset {}", open, offset)
            }
            DecodeError::Mismatched {
                expected,
                found,
                offset,
            } => write!(
                f,
                "expected '{}' but found '{}' at offset {}",
                expected, found, offset
            ),
            DecodeError::UnexpectedClose { close, offset } => {
                write!(f, "unexpected '{}' at offset {}", close, offset)
            }
            DecodeError::UnterminatedString { offset } => {
                write!(f, "unterminated string starting at offset {}", offset)
            }
            DecodeError::TrailingInput { offset } => {
                write!(f, "unexpected text after value at offset {}", offset)
            }
            DecodeError::MissingArrow { arrow, entry } => {
                write!(f, "entry '{}' has no '{}'", entry, arrow)
            }
        }
    }
}

impl DecodeError {
    /// Move a position reported against a slice onto the enclosing text
    pub(crate) fn shifted(self, by: usize) -> Self {
        match self {
            DecodeError::Unmatched { open, offset } => DecodeError::Unmatched {
                open,
                offset: offset + by,
            },
            DecodeError::Mismatched {
                expected,
                found,
                offset,
            } => DecodeError::Mismatched {
                expected,
                found,
                offset: offset + by,
            },
            DecodeError::UnexpectedClose { close, offset } => DecodeError::UnexpectedClose {
                close,
                offset: offset + by,
            },
            DecodeError::UnterminatedString { offset } => DecodeError::UnterminatedString {
                offset: offset + by,
            },
            DecodeError::TrailingInput { offset } => DecodeError::TrailingInput {
                offset: offset + by,
            },
            other @ (DecodeError::Empty | DecodeError::MissingArrow { .. }) => other,
        }
    }
}

impl std::error::Error for DecodeError {}

/// Failure while reading a trace stream
#[derive(Debug)]
pub enum ReadError {
    /// IO operation failed
    Io(std::io::Error),

    /// A variable's value could not be decoded; the rest of the trace is abandoned
    Decode {
        line: usize,
        variable: String,
        source: DecodeError,
    },

    /// A `/\` line without `name = value`
    MalformedAssignment { line: usize, text: String },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(err) => write!(f, "IO error: {}", err),
            ReadError::Decode {
                line,
                variable,
                source,
            } => write!(
                f,
                "line {}: cannot decode variable '{}': {}",
                line, variable, source
            ),
            ReadError::MalformedAssignment { line, text } => {
                write!(f, "line {}: malformed assignment '{}'", line, text)
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(err) => Some(err),
            ReadError::Decode { source, .. } => Some(source),
            ReadError::MalformedAssignment { .. } => None,
        }
    }
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err)
    }
}

/// Error types for the remaining readers (DOT graphs)
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Input parsing failed
    Parse { line: usize, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Parse { line, message } => write!(f, "Parse error at line {}: {}", line, message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
