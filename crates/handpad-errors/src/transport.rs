//! Physical controller transport errors.
//!
//! A read that fails is classified into a [`TransportFault`]: transient faults
//! carry the [`Recovery`] step the controller performs before the next tick,
//! fatal faults turn into a controller-removed state, everything else is
//! swallowed so one bad read never stops the stream.

use crate::common::ErrorSeverity;

/// Errors raised while pulling a raw sample from a controller transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The device handle exists but is not acquired by this process
    #[error("Device not acquired")]
    NotAcquired,

    /// The input buffer was lost and the device must be re-attached
    #[error("Device input lost")]
    InputLost,

    /// The device is physically gone
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// No report arrived within the read window
    #[error("Read timed out after {timeout_ms}ms")]
    Timeout {
        /// Read window in milliseconds
        timeout_ms: u32,
    },

    /// Report shorter than the layout requires
    #[error("Short report: expected {expected} bytes, got {actual}")]
    ShortReport {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Any other transport failure
    #[error("Transport failure: {0}")]
    Other(String),
}

/// Local recovery step for a transient transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// Acquire the existing handle again
    Reacquire,
    /// Tear down and rebuild the device attachment
    Reattach,
}

/// Classification of a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFault {
    /// Recover in place, invisible to the user
    Transient(Recovery),
    /// Device gone, surface as a disconnect
    Fatal,
    /// Swallow for this tick
    Ignored,
}

impl TransportError {
    /// Classify this error into the recovery policy the tick loop applies.
    pub fn classify(&self) -> TransportFault {
        match self {
            TransportError::NotAcquired => TransportFault::Transient(Recovery::Reacquire),
            TransportError::InputLost => TransportFault::Transient(Recovery::Reattach),
            TransportError::Disconnected(_) => TransportFault::Fatal,
            TransportError::Timeout { .. }
            | TransportError::ShortReport { .. }
            | TransportError::Other(_) => TransportFault::Ignored,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self.classify() {
            TransportFault::Transient(_) => ErrorSeverity::Info,
            TransportFault::Fatal => ErrorSeverity::Critical,
            TransportFault::Ignored => ErrorSeverity::Warning,
        }
    }

    /// Check if the device should be considered gone.
    pub fn is_fatal(&self) -> bool {
        self.classify() == TransportFault::Fatal
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        TransportError::Disconnected(device.into())
    }

    /// Create a generic transport error.
    pub fn other(msg: impl Into<String>) -> Self {
        TransportError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_acquired_reacquires() {
        assert_eq!(
            TransportError::NotAcquired.classify(),
            TransportFault::Transient(Recovery::Reacquire)
        );
    }

    #[test]
    fn test_input_lost_reattaches() {
        assert_eq!(
            TransportError::InputLost.classify(),
            TransportFault::Transient(Recovery::Reattach)
        );
    }

    #[test]
    fn test_other_errors_are_swallowed() {
        assert_eq!(
            TransportError::other("crc mismatch").classify(),
            TransportFault::Ignored
        );
        assert_eq!(
            TransportError::Timeout { timeout_ms: 4 }.classify(),
            TransportFault::Ignored
        );
    }

    #[test]
    fn test_disconnect_is_fatal() {
        let err = TransportError::disconnected("neptune");
        assert!(err.is_fatal());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
