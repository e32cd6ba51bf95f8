//! Canonical input identifiers and per-tick controller state.
//!
//! Every physical or logical channel a handheld exposes is named by a
//! [`ButtonFlags`] or [`AxisFlags`] value. Flag discriminants are stable small
//! integers: they key the sparse state maps and index fixed report fields, so
//! they never change once assigned.
//!
//! [`ControllerState`] aggregates one [`ButtonState`], one [`AxisState`] and
//! one [`GyroState`] and is what flows from a controller driver, through the
//! layout actions, into a virtual target.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod flags;
pub mod state;
pub mod utils;
pub mod vector;

pub use flags::{AxisChannels, AxisFlags, AxisLayoutFlags, ButtonFlags};
pub use state::{AxisState, ButtonState, ControllerState, GyroState};
pub use utils::{
    SensorSpec, map_range, normalize_xbox_input, range_map, saturate_i16, saturate_u8,
    touch_to_directions,
};
pub use vector::{Axis3, Vector2, Vector3};

use thiserror::Error;

/// Errors raised when decoding identifiers from raw values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown button flag: {0}")]
    UnknownButton(u8),

    #[error("Unknown axis flag: {0}")]
    UnknownAxis(u8),

    #[error("Unknown axis layout flag: {0}")]
    UnknownAxisLayout(u8),
}

pub type InputResult<T> = Result<T, InputError>;
