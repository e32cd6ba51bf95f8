//! Convenience re-exports for test modules.

pub use crate::assert_approx_eq;
pub use crate::must::{must, must_err, must_some, must_with};
