//! Snapshot tests for error message formatting.
//!
//! Error text ends up in logs that users attach to bug reports, so the
//! wording is pinned here.

use handpad_errors::{BusError, HandpadError, TransportError, ValidationError};
use insta::assert_snapshot;

mod transport_error_snapshots {
    use super::*;

    #[test]
    fn test_not_acquired() {
        assert_snapshot!(TransportError::NotAcquired.to_string(), @"Device not acquired");
    }

    #[test]
    fn test_input_lost() {
        assert_snapshot!(TransportError::InputLost.to_string(), @"Device input lost");
    }

    #[test]
    fn test_disconnected() {
        assert_snapshot!(
            TransportError::disconnected("Steam Deck").to_string(),
            @"Device disconnected: Steam Deck"
        );
    }

    #[test]
    fn test_short_report() {
        assert_snapshot!(
            TransportError::ShortReport { expected: 64, actual: 12 }.to_string(),
            @"Short report: expected 64 bytes, got 12"
        );
    }
}

mod bus_error_snapshots {
    use super::*;

    #[test]
    fn test_bus_not_found() {
        assert_snapshot!(BusError::BusNotFound.to_string(), @"Virtual bus not found");
    }

    #[test]
    fn test_invalid_target() {
        assert_snapshot!(BusError::InvalidTarget.to_string(), @"Invalid virtual target");
    }
}

mod validation_error_snapshots {
    use super::*;

    #[test]
    fn test_invalid_axis_swap() {
        assert_snapshot!(
            ValidationError::invalid_axis_swap("ROG Ally gyro", "X->X, Y->X, Z->Z").to_string(),
            @"Axis swap for 'ROG Ally gyro' is not a bijection over X, Y, Z: X->X, Y->X, Z->Z"
        );
    }

    #[test]
    fn test_invalid_sign() {
        assert_snapshot!(
            ValidationError::invalid_sign("Legion Go accel", 'Z', 0.0).to_string(),
            @"Sign vector for 'Legion Go accel' has component 0.0 on axis Z, expected 1 or -1"
        );
    }

    #[test]
    fn test_wrapped_in_top_level() {
        let err: HandpadError = ValidationError::required("turbo_delay_ms").into();
        assert_snapshot!(
            err.to_string(),
            @"Validation error: Required field 'turbo_delay_ms' is missing"
        );
    }
}
