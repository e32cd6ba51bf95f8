//! Handheld device descriptors.
//!
//! Each supported handheld is one [`DeviceDescriptor`] record rather than a
//! type of its own: IMU axis tables, USB ids, firmware model strings and OEM
//! button chords. The [`DeviceRegistry`] validates every record on
//! registration and resolves the running device by USB id, then by model
//! strings, falling back to a generic descriptor with identity tables.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod chord;
pub mod descriptor;
pub mod ids;
pub mod registry;

pub use chord::{ChordRunner, InjectedButtons, KeySink};
pub use descriptor::{DEFAULT_KEY_PRESS_DELAY_MS, DeviceDescriptor, OemChord, UsbId};
pub use registry::{DeviceRegistry, builtin_descriptors};
