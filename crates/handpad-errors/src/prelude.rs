//! Prelude module for convenient error handling imports.
//!
//! ```
//! use handpad_errors::prelude::*;
//!
//! fn require_name(name: &str) -> Result<&str> {
//!     if name.is_empty() {
//!         return Err(ValidationError::required("name").into());
//!     }
//!     Ok(name)
//! }
//!
//! assert!(require_name("").is_err());
//! ```

pub use crate::{
    Result, TransportResult,
    bus::BusError,
    common::{ErrorCategory, ErrorSeverity, HandpadError},
    transport::{Recovery, TransportError, TransportFault},
    validation::ValidationError,
};

/// Return early with an out of range validation error.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if $value < $min || $value > $max {
            return Err($crate::ValidationError::out_of_range($field, $value, $min, $max).into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range_macro() {
        fn check(value: u8) -> std::result::Result<(), ValidationError> {
            validate_range!("outer_deadzone", value, 0_u8, 100_u8);
            Ok(())
        }
        assert_eq!(check(50), Ok(()));
        assert!(matches!(check(101), Err(ValidationError::OutOfRange { .. })));
    }
}
