//! Error types shared by every section backend.

use std::io;
use std::path::PathBuf;

/// Errors raised by sections and their backends.
///
/// Absence is never an error: reads report it through their `found`/`exists`
/// results. Only writes of unrepresentable values and storage faults surface
/// here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The value handed to `set` is not one of the six scalar kinds.
    #[error("section set: unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    /// A persisted document could not be decoded.
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A value could not be encoded for persistence.
    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

impl Error {
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Error::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            error,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Encode {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::unsupported(msg.to_string())
    }
}
