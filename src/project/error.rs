//! Error type for project files

use std::{error, fmt, io, result};

/// Error type for reading and writing project files.
#[derive(Debug)]
pub enum Error {
    /// Underlying cause of error is I/O related.
    IoError(io::Error),

    /// The project file is not valid JSON of the expected shape.
    FormatError(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            IoError(e) => write!(f, "I/O error: {}", e),
            FormatError(e) => write!(f, "Malformed project file: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use Error::*;

        match self {
            IoError(e) => Some(e),
            FormatError(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IoError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::FormatError(e)
    }
}

pub type Result<T> = result::Result<T, Error>;
