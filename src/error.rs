//! Error types for the opinion bridge

use std::path::PathBuf;

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, OpinionError>;

/// Errors that can occur while crossing the engine boundary
#[derive(Debug, Error)]
pub enum OpinionError {
    /// An input string could not be handed to the native engine
    #[error("{field} contains an interior NUL byte")]
    NulByte { field: &'static str },

    /// The engine's process-wide model state has already been loaded
    #[error("opinion engine is already initialized")]
    AlreadyInitialized,

    /// The engine returned bytes that are not valid UTF-8
    #[error("engine output is not valid UTF-8")]
    OutputEncoding,

    /// A conventional resource file is missing from the resource directory
    #[error("missing resource file: {}", .0.display())]
    MissingResource(PathBuf),

    /// A structurally valid engine record carried an unparsable field
    #[error("malformed opinion frame: {0}")]
    Frame(String),
}
