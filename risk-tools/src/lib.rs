//! Tool interface for the risk-intelligence client
//!
//! Exposes the seven risk operations as named tools taking JSON arguments,
//! served over a JSON-lines stdio loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod router;
pub mod server;
pub mod tools;

pub use error::{Result, ToolError};
pub use router::{ToolResponse, ToolRouter};
pub use tools::{tool_definitions, ToolDefinition, ToolName};
