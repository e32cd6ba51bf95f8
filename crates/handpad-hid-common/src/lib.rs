//! Raw report and transport plumbing shared by the controller drivers.
//!
//! - [`ReportParser`]: bounds-checked reads from a raw input report
//! - [`ReportBuilder`]: fixed-layout output reports written at offsets
//! - [`Transport`]: the seam between a controller driver and its device,
//!   with an in-memory [`mock`] for tests and, behind the `hidapi` feature,
//!   a real HID implementation

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
#[cfg(feature = "hidapi")]
pub mod hidapi_transport;
pub mod report_parser;
pub mod transport;

pub use device_info::HidDeviceInfo;
#[cfg(feature = "hidapi")]
pub use hidapi_transport::HidApiTransport;
pub use report_parser::{ReportBuilder, ReportParser};
pub use transport::{Transport, mock};
