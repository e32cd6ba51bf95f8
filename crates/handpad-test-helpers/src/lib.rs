//! Shared test utilities for handpad.
//!
//! - [`mod@must`] - Unwrap helpers with `#[track_caller]` and the error in the message
//! - [`assertions`] - Tolerance-based float assertions
//!
//! ```toml
//! [dev-dependencies]
//! handpad-test-helpers = { workspace = true }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod must;
pub mod prelude;

pub use must::*;
