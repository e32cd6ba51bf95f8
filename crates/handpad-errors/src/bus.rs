//! Virtual gamepad bus submission errors.

use crate::common::ErrorSeverity;

/// Errors raised by the virtual bus client while connecting or submitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// The bus driver is not installed or not running
    #[error("Virtual bus not found")]
    BusNotFound,

    /// The target handle is no longer valid on the bus
    #[error("Invalid virtual target")]
    InvalidTarget,

    /// The target was used before being connected
    #[error("Virtual target not connected")]
    NotConnected,

    /// Any other bus failure
    #[error("Bus failure: {0}")]
    Other(String),
}

impl BusError {
    /// Get the error severity.
    ///
    /// A missing bus or an invalid target means every report is dropped
    /// until the outer layer reconnects, so both are critical.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BusError::BusNotFound | BusError::InvalidTarget => ErrorSeverity::Critical,
            BusError::NotConnected => ErrorSeverity::Warning,
            BusError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Create a generic bus error.
    pub fn other(msg: impl Into<String>) -> Self {
        BusError::Other(msg.into())
    }
}
