//! Physical controller handling for handpad.
//!
//! A [`Controller`] owns one HID transport and turns its raw reports into
//! canonical [`handpad_input::ControllerState`] once per tick:
//!
//! - [`decoder`]: the [`ReportDecoder`] seam and the supported families
//! - [`xinput`], [`dinput`], [`neptune`]: per-family report layouts
//! - [`gamepad`]: derived buttons shared by every family
//! - [`rumble`]: the per-controller vibration thread
//! - [`controller`]: the tick itself, fault recovery and plug lifecycle

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod controller;
pub mod decoder;
pub mod dinput;
pub mod gamepad;
pub mod neptune;
pub mod rumble;
pub mod xinput;

pub use controller::{
    Controller, ControllerConfig, MotionSensors, SharedTransport, TickOutcome,
};
pub use decoder::{ControllerKind, ReportDecoder, Vibration};
pub use rumble::{RumbleConfig, RumbleWorker};
