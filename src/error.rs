use std::fmt;
use std::io;

/// Error type for every fallible operation in this crate.
///
/// Soft per-character sequence errors (disallowed bases, IUPAC budget
/// overruns) are handled locally by the extractor and never surface here;
/// everything that reaches a `SansError` is either a configuration mistake,
/// an I/O failure, or a broken program invariant.
#[derive(Debug)]
pub enum SansError {
    /// Bad CLI flag combination, out-of-range parameter, or unreadable path
    /// discovered before any work starts.
    Configuration(String),
    /// A file could not be read or did not parse as the expected format.
    Input(String),
    /// A program invariant was violated (e.g. tree refinement found a split
    /// set that was supposed to be strict-compatible but wasn't).
    Invariant(String),
    Io(io::Error),
}

impl fmt::Display for SansError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SansError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            SansError::Input(msg) => write!(f, "input error: {msg}"),
            SansError::Invariant(msg) => write!(f, "internal error: {msg}"),
            SansError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for SansError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SansError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SansError {
    fn from(err: io::Error) -> Self {
        SansError::Io(err)
    }
}

pub type SansResult<T> = Result<T, SansError>;
