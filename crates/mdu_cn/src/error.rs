//! Error types for mdu_cn

use mdu_core::error::MduError;
use mdu_core::id::ControlId;
use thiserror::Error;

/// Reasons a control could not be wrapped in a dropdown widget
///
/// None of these interrupt the page; the registry logs them and leaves the
/// native control in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The control has no real options yet (data may still be loading)
    #[error("control {control} has no options to show")]
    Underpopulated { control: ControlId },

    /// The control does not accept multiple values
    #[error("control {control} is not a multi-value select")]
    NotMultiple { control: ControlId },
}

/// Result type for mdu_cn operations
pub type Result<T> = std::result::Result<T, WidgetError>;

impl From<WidgetError> for MduError {
    fn from(err: WidgetError) -> Self {
        MduError::Other(err.to_string())
    }
}
