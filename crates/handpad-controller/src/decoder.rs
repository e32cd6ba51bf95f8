//! Raw report decoding and rumble encoding per controller family.

use core::fmt;

use handpad_errors::TransportResult;
use handpad_input::ControllerState;
use serde::{Deserialize, Serialize};

use crate::dinput::DInputDecoder;
use crate::neptune::{self, NeptuneDecoder};
use crate::xinput::{self, XInputDecoder};

/// Turns one raw input report into canonical state.
///
/// `decode` writes every channel it owns into `state`, including released
/// buttons and zero axes, so the previous tick never leaks through.
pub trait ReportDecoder: Send {
    fn kind(&self) -> ControllerKind;

    /// Smallest report the decoder accepts.
    fn report_len(&self) -> usize;

    /// # Errors
    ///
    /// [`handpad_errors::TransportError::ShortReport`] for truncated reports,
    /// [`handpad_errors::TransportError::Other`] for reports that are not
    /// input reports. Both are dropped for the tick.
    fn decode(&mut self, report: &[u8], state: &mut ControllerState) -> TransportResult;
}

/// Motor speeds requested by the virtual target, 0-255 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vibration {
    pub large: u8,
    pub small: u8,
}

impl Vibration {
    pub const OFF: Vibration = Vibration { large: 0, small: 0 };

    pub const fn new(large: u8, small: u8) -> Self {
        Self { large, small }
    }

    pub const fn is_off(self) -> bool {
        self.large == 0 && self.small == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// XUSB-style gamepad report.
    XInput,
    /// Generic HID joystick with unsigned axes and a hat switch.
    DInput,
    /// Steam Deck built-in controller.
    Neptune,
}

impl ControllerKind {
    pub fn decoder(self) -> Box<dyn ReportDecoder> {
        match self {
            ControllerKind::XInput => Box::new(XInputDecoder::new()),
            ControllerKind::DInput => Box::new(DInputDecoder::new()),
            ControllerKind::Neptune => Box::new(NeptuneDecoder::new()),
        }
    }

    /// Whether the input report carries the controller's own IMU.
    pub const fn reports_motion(self) -> bool {
        matches!(self, ControllerKind::Neptune)
    }

    /// Output reports that play `vibration` scaled by `strength` (0-1).
    ///
    /// `timestamp_ms` stamps protocols that carry one. An empty list means
    /// the family has no rumble.
    pub fn rumble_reports(
        self,
        vibration: Vibration,
        strength: f32,
        timestamp_ms: u32,
    ) -> Vec<Vec<u8>> {
        match self {
            ControllerKind::XInput => vec![xinput::rumble_report(vibration, strength)],
            ControllerKind::DInput => Vec::new(),
            ControllerKind::Neptune => neptune::haptic_reports(vibration, strength, timestamp_ms),
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerKind::XInput => "XInput",
            ControllerKind::DInput => "DInput",
            ControllerKind::Neptune => "Neptune",
        };
        f.write_str(name)
    }
}
