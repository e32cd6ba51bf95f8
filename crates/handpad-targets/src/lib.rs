//! Virtual gamepad targets for handpad.
//!
//! The logical [`handpad_input::ControllerState`] produced by the layout
//! engine is packed into the wire report of the emulated controller and
//! submitted to the virtual bus every tick.
//!
//! - [`bus`]: the [`VirtualBus`] seam and a recording mock
//! - [`xbox360`]: XUSB report packing
//! - [`dualshock4`]: `DS4_REPORT_EX` packing, including touch and motion
//! - [`target`]: connect/submit lifecycle and rumble feedback

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod bus;
pub mod dualshock4;
pub mod target;
pub mod xbox360;

pub use bus::{SharedBus, TargetHandle, TargetKind, VirtualBus, shared};
pub use dualshock4::{DPad, DualShock4Packer, TouchPoint, TouchTracker};
pub use target::{FeedbackHandler, ReportPacker, SubmitOutcome, VirtualTarget};
pub use xbox360::Xbox360Packer;
