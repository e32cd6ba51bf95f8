//! Property tests for error classification.

use handpad_errors::{
    BusError, ErrorSeverity, HandpadError, TransportError, TransportFault,
};
use proptest::prelude::*;

fn transport_error() -> impl Strategy<Value = TransportError> {
    prop_oneof![
        Just(TransportError::NotAcquired),
        Just(TransportError::InputLost),
        "[a-z ]{0,16}".prop_map(TransportError::Disconnected),
        any::<u32>().prop_map(|timeout_ms| TransportError::Timeout { timeout_ms }),
        (any::<u8>(), any::<u8>()).prop_map(|(e, a)| TransportError::ShortReport {
            expected: usize::from(e),
            actual: usize::from(a),
        }),
        "[a-z ]{0,16}".prop_map(TransportError::Other),
    ]
}

proptest! {
    #[test]
    fn prop_only_disconnect_is_fatal(err in transport_error()) {
        let fatal = matches!(err, TransportError::Disconnected(_));
        prop_assert_eq!(err.classify() == TransportFault::Fatal, fatal);
    }

    #[test]
    fn prop_transient_faults_are_never_above_info(err in transport_error()) {
        if let TransportFault::Transient(_) = err.classify() {
            prop_assert_eq!(err.severity(), ErrorSeverity::Info);
        }
    }

    #[test]
    fn prop_top_level_keeps_transport_severity(err in transport_error()) {
        let expected = err.severity();
        let wrapped: HandpadError = err.into();
        prop_assert_eq!(wrapped.severity(), expected);
    }

    #[test]
    fn prop_bus_other_is_recoverable(msg in "[a-z]{1,12}") {
        let err: HandpadError = BusError::other(msg).into();
        prop_assert!(err.is_recoverable());
    }
}
