//! Motion sensor normalization for handpad.
//!
//! Raw gyroscope and accelerometer samples arrive in whatever frame the IMU
//! happens to be mounted in. This crate converts them into the canonical
//! right-handed device frame (accelerometer in g, gyroscope in deg/s):
//!
//! - [`calibration`]: per-device axis swap and sign tables
//! - [`filter`]: One-Euro smoothing for jittery sources
//! - [`imu`]: readers that combine the two over a [`SensorBackend`]

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod calibration;
pub mod filter;
pub mod imu;

pub use calibration::{AxisSwap, SensorCalibration};
pub use filter::{LowPassState, OneEuroConfig, OneEuroState, Vector3Filter};
pub use imu::{ImuReader, SensorBackend, SensorFamily, SensorKind, auto_roll_yaw_swap};
