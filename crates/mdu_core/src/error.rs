//! Error types for mdu_core

use thiserror::Error;

use crate::id::ControlId;

/// Errors shared across the widget layers
#[derive(Error, Debug)]
pub enum MduError {
    /// No control with this identity exists on the page
    #[error("control not found: {0}")]
    ControlNotFound(ControlId),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for mdu_core operations
pub type Result<T> = std::result::Result<T, MduError>;
