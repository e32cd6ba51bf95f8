//! Xbox 360 (XUSB) input report.
//!
//! 12 bytes little-endian: `wButtons`, left and right trigger bytes, then
//! the four signed 16-bit stick axes (LX, LY, RX, RY). Positive Y is up.

use std::time::Duration;

use handpad_hid_common::ReportBuilder;
use handpad_input::{AxisFlags, ButtonFlags, ButtonState, ControllerState};

use crate::bus::TargetKind;
use crate::target::ReportPacker;

pub const REPORT_LEN: usize = 12;

pub mod buttons {
    pub const UP: u16 = 0x0001;
    pub const DOWN: u16 = 0x0002;
    pub const LEFT: u16 = 0x0004;
    pub const RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const GUIDE: u16 = 0x0400;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;
}

const BUTTON_MAP: [(ButtonFlags, u16); 15] = [
    (ButtonFlags::B1, buttons::A),
    (ButtonFlags::B2, buttons::B),
    (ButtonFlags::B3, buttons::X),
    (ButtonFlags::B4, buttons::Y),
    (ButtonFlags::DPadUp, buttons::UP),
    (ButtonFlags::DPadDown, buttons::DOWN),
    (ButtonFlags::DPadLeft, buttons::LEFT),
    (ButtonFlags::DPadRight, buttons::RIGHT),
    (ButtonFlags::Back, buttons::BACK),
    (ButtonFlags::Start, buttons::START),
    (ButtonFlags::L1, buttons::LEFT_SHOULDER),
    (ButtonFlags::R1, buttons::RIGHT_SHOULDER),
    (ButtonFlags::LeftStickClick, buttons::LEFT_THUMB),
    (ButtonFlags::RightStickClick, buttons::RIGHT_THUMB),
    (ButtonFlags::Special, buttons::GUIDE),
];

/// Buttons the report can carry.
pub fn reported_buttons() -> impl Iterator<Item = ButtonFlags> {
    BUTTON_MAP.iter().map(|(flag, _)| *flag)
}

/// `wButtons` for the pressed set.
pub fn button_mask(state: &ButtonState) -> u16 {
    BUTTON_MAP
        .iter()
        .filter(|(flag, _)| state.get(*flag))
        .fold(0, |mask, (_, bit)| mask | bit)
}

/// Trigger axis (0-255 in canonical state) as a report byte.
pub fn trigger_byte(value: i16) -> u8 {
    u8::try_from(value.clamp(0, i16::from(u8::MAX))).unwrap_or(u8::MAX)
}

#[derive(Debug, Clone)]
pub struct Xbox360Packer {
    report: Vec<u8>,
}

impl Default for Xbox360Packer {
    fn default() -> Self {
        Self::new()
    }
}

impl Xbox360Packer {
    pub fn new() -> Self {
        Self {
            report: vec![0u8; REPORT_LEN],
        }
    }
}

impl ReportPacker for Xbox360Packer {
    fn kind(&self) -> TargetKind {
        TargetKind::Xbox360
    }

    fn pack(&mut self, state: &ControllerState, _delta: Duration) -> &[u8] {
        let axes = &state.axes;
        let mut builder = ReportBuilder::new(REPORT_LEN);
        builder
            .put_u16_le(0, button_mask(&state.buttons))
            .put_u8(2, trigger_byte(axes.get(AxisFlags::L2)))
            .put_u8(3, trigger_byte(axes.get(AxisFlags::R2)))
            .put_i16_le(4, axes.get(AxisFlags::LeftStickX))
            .put_i16_le(6, axes.get(AxisFlags::LeftStickY))
            .put_i16_le(8, axes.get(AxisFlags::RightStickX))
            .put_i16_le(10, axes.get(AxisFlags::RightStickY));
        self.report = builder.into_inner();
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_buttons() {
        let state = ButtonState::new()
            .with(ButtonFlags::B1)
            .with(ButtonFlags::B4)
            .with(ButtonFlags::Special);
        assert_eq!(button_mask(&state), buttons::A | buttons::Y | buttons::GUIDE);
    }

    #[test]
    fn test_unmapped_buttons_are_ignored() {
        let state = ButtonState::new()
            .with(ButtonFlags::OEM1)
            .with(ButtonFlags::L2Full);
        assert_eq!(button_mask(&state), 0);
    }

    #[test]
    fn test_trigger_byte_saturates() {
        assert_eq!(trigger_byte(-5), 0);
        assert_eq!(trigger_byte(128), 128);
        assert_eq!(trigger_byte(300), 255);
    }

    #[test]
    fn test_pack_layout() {
        let mut state = ControllerState::new();
        state.buttons.set(ButtonFlags::DPadUp, true);
        state.axes.set(AxisFlags::R2, 255);
        state.axes.set(AxisFlags::LeftStickY, i16::MIN);

        let mut packer = Xbox360Packer::new();
        let report = packer.pack(&state, Duration::from_millis(10));
        assert_eq!(
            report,
            &[0x01, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00]
        );
    }
}
