//! Error types for mounting and registry lookups.
//!
//! The reactive core itself never fails. Everything here is reported at the
//! failure site through `tracing` as well, so callers that only want the
//! log-and-continue behaviour can drop the `Err`.

use thiserror::Error;

/// Result type alias for arbor operations.
pub type Result<T> = std::result::Result<T, ArborError>;

/// Errors that can occur while mounting or looking up registered content.
#[derive(Error, Debug)]
pub enum ArborError {
    /// The configured mount root does not exist in the render target.
    #[error("Mount root '{id}' not found")]
    RootNotFound {
        id: String,
    },

    /// No component is registered under this name.
    #[error("Component '{0}' not found")]
    ComponentNotFound(String),

    /// No updatable region is registered under this name.
    #[error("Updatable '{0}' not found")]
    UpdatableNotFound(String),

    /// The mount configuration could not be parsed.
    #[error("Invalid mount configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
