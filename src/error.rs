//! Error types for the calendar engine.

use thiserror::Error;

/// Errors that can occur inside engine operations.
///
/// The public engine contract is boolean-failure (see crate docs), so these
/// never cross the API surface; they are the internal currency of the edit
/// and validation paths before results collapse to `bool`.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unknown event property: {0}")]
    UnknownProperty(String),

    #[error("Invalid datetime '{0}'. Expected YYYY-MM-DDTHH:MM")]
    InvalidDateTime(String),
}

/// Result type alias for engine operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
