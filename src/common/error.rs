//! Top-level error type for the MM1 tracer
//!
//! Wraps the component errors and maps each to the process exit code:
//! usage, I/O and configuration problems exit 1; any structural problem
//! found in the capture exits 2.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::decoder::DecodeError;

/// Exit code for a clean trace
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for usage, I/O and configuration errors
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for structural validation failures
pub const EXIT_INVALID_DATA: i32 = 2;

/// Errors surfaced by a trace run
#[derive(Error, Debug)]
pub enum TraceError {
    /// Malformed command line
    #[error("usage: {0}")]
    Usage(String),

    /// Capture file could not be read
    #[error("reading {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error writing the trace
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Structural error in the capture
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

impl TraceError {
    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Decode(_) => EXIT_INVALID_DATA,
            Self::Usage(_) | Self::Read { .. } | Self::Io(_) | Self::Config(_) => EXIT_FAILURE,
        }
    }
}

/// Result type alias using TraceError
pub type TraceResult<T> = Result<T, TraceError>;
