//! Centralized error types for handpad
//!
//! The pipeline distinguishes four families of failure:
//!
//! - [`transport`]: reads from the physical controller. Transient faults are
//!   recovered in place by re-acquiring or re-attaching; fatal faults surface
//!   as a disconnect.
//! - [`bus`]: submission of packed reports to the virtual gamepad bus. These
//!   are logged and the tick is dropped.
//! - [`validation`]: malformed calibration tables and mapping configuration,
//!   rejected at construction time.
//! - [`common`]: the umbrella [`HandpadError`] plus severity and category.
//!
//! # Example
//!
//! ```
//! use handpad_errors::prelude::*;
//!
//! fn check_deadzone(inner: u8, outer: u8) -> Result<()> {
//!     if inner >= outer {
//!         return Err(ValidationError::constraint("inner deadzone must be below outer").into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_deadzone(10, 90).is_ok());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bus;
pub mod common;
pub mod prelude;
pub mod transport;
pub mod validation;

pub use bus::BusError;
pub use common::{ErrorCategory, ErrorSeverity, HandpadError};
pub use transport::{Recovery, TransportError, TransportFault};
pub use validation::ValidationError;

/// A specialized `Result` type for handpad operations.
pub type Result<T> = std::result::Result<T, HandpadError>;

/// A specialized `Result` type for transport reads.
pub type TransportResult<T = ()> = std::result::Result<T, TransportError>;
