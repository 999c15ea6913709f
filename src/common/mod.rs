//! Common types shared by the library and the mm1-trace binary

pub mod cli;
pub mod error;

pub use cli::TraceArgs;
pub use error::{TraceError, TraceResult, EXIT_FAILURE, EXIT_INVALID_DATA, EXIT_SUCCESS};
