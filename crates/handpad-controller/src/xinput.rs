//! XUSB-style gamepad reports.
//!
//! Input layout, 12 bytes little-endian:
//!
//! | offset | field |
//! |---|---|
//! | 0 | `wButtons` |
//! | 2 | left trigger, right trigger |
//! | 4 | left stick X, Y |
//! | 8 | right stick X, Y |

use handpad_errors::TransportResult;
use handpad_hid_common::ReportParser;
use handpad_input::{AxisFlags, ButtonFlags, ControllerState, Vector3, map_range};

use crate::decoder::{ControllerKind, ReportDecoder, Vibration};
use crate::gamepad::{Stick, stick_direction_buttons, trigger_buttons};

pub const REPORT_LEN: usize = 12;

pub mod buttons {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
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

const BUTTON_MAP: [(u16, ButtonFlags); 15] = [
    (buttons::A, ButtonFlags::B1),
    (buttons::B, ButtonFlags::B2),
    (buttons::X, ButtonFlags::B3),
    (buttons::Y, ButtonFlags::B4),
    (buttons::START, ButtonFlags::Start),
    (buttons::BACK, ButtonFlags::Back),
    (buttons::LEFT_THUMB, ButtonFlags::LeftStickClick),
    (buttons::RIGHT_THUMB, ButtonFlags::RightStickClick),
    (buttons::LEFT_SHOULDER, ButtonFlags::L1),
    (buttons::RIGHT_SHOULDER, ButtonFlags::R1),
    (buttons::DPAD_UP, ButtonFlags::DPadUp),
    (buttons::DPAD_DOWN, ButtonFlags::DPadDown),
    (buttons::DPAD_LEFT, ButtonFlags::DPadLeft),
    (buttons::DPAD_RIGHT, ButtonFlags::DPadRight),
    (buttons::GUIDE, ButtonFlags::Special),
];

#[derive(Debug, Default)]
pub struct XInputDecoder;

impl XInputDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportDecoder for XInputDecoder {
    fn kind(&self) -> ControllerKind {
        ControllerKind::XInput
    }

    fn report_len(&self) -> usize {
        REPORT_LEN
    }

    fn decode(&mut self, report: &[u8], state: &mut ControllerState) -> TransportResult {
        let parser = ReportParser::new(report);
        parser.require(REPORT_LEN)?;

        let pressed = parser.u16_le_at(0)?;
        for (mask, button) in BUTTON_MAP {
            state.buttons.set(button, pressed & mask != 0);
        }

        state.axes.set(AxisFlags::L2, i16::from(parser.u8_at(2)?));
        state.axes.set(AxisFlags::R2, i16::from(parser.u8_at(3)?));
        state.axes.set(AxisFlags::LeftStickX, parser.i16_le_at(4)?);
        state.axes.set(AxisFlags::LeftStickY, parser.i16_le_at(6)?);
        state.axes.set(AxisFlags::RightStickX, parser.i16_le_at(8)?);
        state.axes.set(AxisFlags::RightStickY, parser.i16_le_at(10)?);

        trigger_buttons(state);
        stick_direction_buttons(state, Stick::Left);
        stick_direction_buttons(state, Stick::Right);

        // No IMU on this family.
        state.gyro.accelerometer = Vector3::ZERO;
        state.gyro.gyroscope = Vector3::ZERO;
        Ok(())
    }
}

/// Motor speed on the 16-bit scale the XInput API uses.
pub fn motor_speed(value: u8, strength: f32) -> u16 {
    let speed = map_range(
        f32::from(value) * strength.clamp(0.0, 1.0),
        0.0,
        f32::from(u8::MAX),
        0.0,
        f32::from(u16::MAX),
    );
    speed.round().clamp(0.0, f32::from(u16::MAX)) as u16
}

/// XUSB rumble output report: id, length, then the high byte of each motor.
pub fn rumble_report(vibration: Vibration, strength: f32) -> Vec<u8> {
    let [large, _] = motor_speed(vibration.large, strength).to_be_bytes();
    let [small, _] = motor_speed(vibration.small, strength).to_be_bytes();
    vec![0x00, 0x08, 0x00, large, small, 0x00, 0x00, 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;
    use handpad_test_helpers::must;

    fn report(pressed: u16, lt: u8, rt: u8, sticks: [i16; 4]) -> Vec<u8> {
        let mut data = pressed.to_le_bytes().to_vec();
        data.extend([lt, rt]);
        for axis in sticks {
            data.extend(axis.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_face_buttons_map_to_b1_b4() {
        let mut state = ControllerState::new();
        let data = report(buttons::A | buttons::Y | buttons::GUIDE, 0, 0, [0; 4]);
        must(XInputDecoder::new().decode(&data, &mut state));

        assert!(state.buttons.get(ButtonFlags::B1));
        assert!(state.buttons.get(ButtonFlags::B4));
        assert!(state.buttons.get(ButtonFlags::Special));
        assert!(!state.buttons.get(ButtonFlags::B2));
    }

    #[test]
    fn test_axes_and_derived_buttons() {
        let mut state = ControllerState::new();
        let data = report(0, 255, 10, [i16::MIN, 0, 0, 9000]);
        must(XInputDecoder::new().decode(&data, &mut state));

        assert_eq!(state.axes.get(AxisFlags::L2), 255);
        assert_eq!(state.axes.get(AxisFlags::LeftStickX), i16::MIN);
        assert!(state.buttons.get(ButtonFlags::L2Full));
        assert!(!state.buttons.get(ButtonFlags::R2Soft));
        assert!(state.buttons.get(ButtonFlags::LeftStickLeft));
        assert!(state.buttons.get(ButtonFlags::RightStickUp));
    }

    #[test]
    fn test_released_buttons_are_cleared() {
        let mut decoder = XInputDecoder::new();
        let mut state = ControllerState::new();
        must(decoder.decode(&report(buttons::B, 0, 0, [0; 4]), &mut state));
        must(decoder.decode(&report(0, 0, 0, [0; 4]), &mut state));
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn test_short_report_is_rejected() {
        let mut state = ControllerState::new();
        let result = XInputDecoder::new().decode(&[0u8; 6], &mut state);
        assert!(matches!(
            result,
            Err(handpad_errors::TransportError::ShortReport {
                expected: 12,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_rumble_scales_with_strength() {
        assert_eq!(motor_speed(255, 1.0), u16::MAX);
        assert_eq!(motor_speed(255, 0.5), 32768);
        assert_eq!(motor_speed(0, 1.0), 0);
        assert_eq!(
            rumble_report(Vibration::new(255, 0), 1.0),
            vec![0x00, 0x08, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00]
        );
    }
}
