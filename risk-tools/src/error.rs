//! Error types for the tool layer

use thiserror::Error;

/// Tool invocation error
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not in the catalogue
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not decode into the tool's request type
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    /// Arguments decoded but violate a precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stdio failure in the server loop
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the tool layer
pub type Result<T> = std::result::Result<T, ToolError>;
