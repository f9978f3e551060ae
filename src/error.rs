use std::path::PathBuf;
use thiserror::Error;

/// Failures the tools classify explicitly. Anything else travels as a plain
/// `anyhow::Error` and is reported with its message.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Input file not found at {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("document has {pages} pages, limit is {limit}")]
    PageLimitExceeded { pages: u32, limit: u32 },

    #[error("Invalid Range")]
    InvalidRange { spec: String, reason: String },

    #[error("Unknown mode '{0}' (expected 'all' or 'range')")]
    UnknownMode(String),

    #[error("{0}")]
    ConversionFailed(String),
}
