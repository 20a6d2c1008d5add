use std::io;

use thiserror::Error;

/// Error type for parsing failures in sysfs and procfs content.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Error type for reading counters and host facts.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The requested zram device is not present.
    #[error("zram{0} device does not exist")]
    MissingDevice(u32),
    /// I/O error reading a kernel file.
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Kernel file content could not be parsed.
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
}

impl CollectError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        CollectError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<String>, source: ParseError) -> Self {
        CollectError::Parse {
            path: path.into(),
            source,
        }
    }
}
