//! Top-level error type and its classification.

use core::fmt;

use crate::{BusError, TransportError, ValidationError};

/// Top-level error type wrapping every handpad sub-error.
#[derive(Debug, thiserror::Error)]
pub enum HandpadError {
    /// Physical controller transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Virtual bus submission errors
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Calibration and configuration validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl HandpadError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            HandpadError::Transport(_) => ErrorCategory::Transport,
            HandpadError::Bus(_) => ErrorCategory::Bus,
            HandpadError::Validation(_) => ErrorCategory::Validation,
            HandpadError::Io(_) => ErrorCategory::IO,
            HandpadError::Config(_) => ErrorCategory::Config,
            HandpadError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HandpadError::Transport(e) => e.severity(),
            HandpadError::Bus(e) => e.severity(),
            HandpadError::Validation(e) => e.severity(),
            HandpadError::Io(_) => ErrorSeverity::Error,
            HandpadError::Config(_) => ErrorSeverity::Error,
            HandpadError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        HandpadError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        HandpadError::Other(msg.into())
    }
}

impl From<std::io::Error> for HandpadError {
    fn from(e: std::io::Error) -> Self {
        HandpadError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Physical controller transport
    Transport = 0,
    /// Virtual gamepad bus
    Bus = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Validation errors
    Validation = 4,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Bus => write!(f, "Bus"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the affected component stopped doing useful work
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_category_follows_variant() {
        let err: HandpadError = TransportError::NotAcquired.into();
        assert_eq!(err.category(), ErrorCategory::Transport);

        let err = HandpadError::config("bad tick period");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_bus_failure_is_not_recoverable() {
        let err: HandpadError = BusError::BusNotFound.into();
        assert!(!err.is_recoverable());
    }
}
