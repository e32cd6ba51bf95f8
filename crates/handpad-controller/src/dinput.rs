//! Generic HID joystick reports with unsigned 16-bit axes.
//!
//! Input layout, 18 bytes little-endian:
//!
//! | offset | field |
//! |---|---|
//! | 0 | X, Y (left stick) |
//! | 4 | Z, RotZ (right stick) |
//! | 8 | RotX, RotY (triggers) |
//! | 12 | button bitfield, bit n = button n |
//! | 16 | hat, hundredths of a degree, `0xFFFF` centred |

use handpad_errors::{TransportError, TransportResult};
use handpad_hid_common::ReportParser;
use handpad_input::{AxisFlags, ButtonFlags, ControllerState, Vector3, map_range, saturate_i16};

use crate::decoder::{ControllerKind, ReportDecoder};
use crate::gamepad::{Stick, stick_direction_buttons, trigger_buttons};

pub const REPORT_LEN: usize = 18;

/// Axis value reported on every rotation axis before the first real sample.
const UNINITIALISED_AXIS: u16 = 32767;

const BUTTON_MAP: [(u8, ButtonFlags); 12] = [
    (1, ButtonFlags::B1),
    (2, ButtonFlags::B2),
    (0, ButtonFlags::B3),
    (3, ButtonFlags::B4),
    (4, ButtonFlags::L1),
    (5, ButtonFlags::R1),
    (8, ButtonFlags::Back),
    (9, ButtonFlags::Start),
    (10, ButtonFlags::LeftStickClick),
    (11, ButtonFlags::RightStickClick),
    (15, ButtonFlags::OEM3),
    (16, ButtonFlags::OEM4),
];

const L2_DIGITAL: u8 = 6;
const R2_DIGITAL: u8 = 7;

/// Unsigned stick axis to the signed canonical range.
pub fn stick_axis(raw: u16) -> i16 {
    saturate_i16(map_range(
        f32::from(raw),
        f32::from(u16::MIN),
        f32::from(u16::MAX),
        f32::from(i16::MIN),
        f32::from(i16::MAX),
    ))
}

/// Unsigned stick axis whose positive direction points down.
pub fn inverted_stick_axis(raw: u16) -> i16 {
    saturate_i16(map_range(
        f32::from(raw),
        f32::from(u16::MAX),
        f32::from(u16::MIN),
        f32::from(i16::MIN),
        f32::from(i16::MAX),
    ))
}

/// Unsigned trigger axis to 0-255.
pub fn trigger_axis(raw: u16) -> i16 {
    saturate_i16(map_range(
        f32::from(raw),
        f32::from(u16::MIN),
        f32::from(u16::MAX),
        f32::from(u8::MIN),
        f32::from(u8::MAX),
    ))
}

/// Up, right, down, left for a hat angle in hundredths of a degree.
pub fn hat_directions(pov: u16) -> [bool; 4] {
    [
        matches!(pov, 0 | 4500 | 31500),
        matches!(pov, 4500 | 9000 | 13500),
        matches!(pov, 13500 | 18000 | 22500),
        matches!(pov, 22500 | 27000 | 31500),
    ]
}

#[derive(Debug, Default)]
pub struct DInputDecoder;

impl DInputDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportDecoder for DInputDecoder {
    fn kind(&self) -> ControllerKind {
        ControllerKind::DInput
    }

    fn report_len(&self) -> usize {
        REPORT_LEN
    }

    fn decode(&mut self, report: &[u8], state: &mut ControllerState) -> TransportResult {
        let mut parser = ReportParser::new(report);
        parser.require(REPORT_LEN)?;

        let x = parser.read_u16_le()?;
        let y = parser.read_u16_le()?;
        let z = parser.read_u16_le()?;
        let rot_z = parser.read_u16_le()?;
        let rot_x = parser.read_u16_le()?;
        let rot_y = parser.read_u16_le()?;
        let pressed = parser.read_u32_le()?;
        let pov = parser.read_u16_le()?;

        if [rot_x, rot_y, rot_z].iter().all(|&v| v == UNINITIALISED_AXIS) {
            return Err(TransportError::other("joystick state not yet initialised"));
        }

        let bit = |index: u8| pressed.checked_shr(u32::from(index)).is_some_and(|b| b & 1 == 1);
        for (index, button) in BUTTON_MAP {
            state.buttons.set(button, bit(index));
        }

        let [up, right, down, left] = hat_directions(pov);
        state.buttons.set(ButtonFlags::DPadUp, up);
        state.buttons.set(ButtonFlags::DPadRight, right);
        state.buttons.set(ButtonFlags::DPadDown, down);
        state.buttons.set(ButtonFlags::DPadLeft, left);

        state.axes.set(AxisFlags::LeftStickX, stick_axis(x));
        state.axes.set(AxisFlags::LeftStickY, inverted_stick_axis(y));
        state.axes.set(AxisFlags::RightStickX, stick_axis(z));
        state.axes.set(AxisFlags::RightStickY, inverted_stick_axis(rot_z));
        state.axes.set(AxisFlags::L2, trigger_axis(rot_x));
        state.axes.set(AxisFlags::R2, trigger_axis(rot_y));

        trigger_buttons(state);
        if bit(L2_DIGITAL) {
            state.buttons.set(ButtonFlags::L2Full, true);
        }
        if bit(R2_DIGITAL) {
            state.buttons.set(ButtonFlags::R2Full, true);
        }
        stick_direction_buttons(state, Stick::Left);
        stick_direction_buttons(state, Stick::Right);

        state.gyro.accelerometer = Vector3::ZERO;
        state.gyro.gyroscope = Vector3::ZERO;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handpad_test_helpers::must;

    const CENTRE: u16 = 32768;

    fn report(axes: [u16; 6], pressed: u32, pov: u16) -> Vec<u8> {
        let mut data = Vec::new();
        for axis in axes {
            data.extend(axis.to_le_bytes());
        }
        data.extend(pressed.to_le_bytes());
        data.extend(pov.to_le_bytes());
        data
    }

    #[test]
    fn test_button_indices() {
        let mut state = ControllerState::new();
        let data = report([CENTRE, CENTRE, CENTRE, CENTRE, 0, 0], 0b1_0000_0000_0000_0001, 0xFFFF);
        must(DInputDecoder::new().decode(&data, &mut state));

        assert!(state.buttons.get(ButtonFlags::B3));
        assert!(state.buttons.get(ButtonFlags::OEM4));
        assert!(!state.buttons.get(ButtonFlags::B1));
        assert!(!state.buttons.get(ButtonFlags::DPadUp));
    }

    #[test]
    fn test_axes_mapping() {
        let mut state = ControllerState::new();
        let data = report([u16::MAX, 0, 0, u16::MAX, u16::MAX, 0], 0, 0xFFFF);
        must(DInputDecoder::new().decode(&data, &mut state));

        assert_eq!(state.axes.get(AxisFlags::LeftStickX), i16::MAX);
        assert_eq!(state.axes.get(AxisFlags::LeftStickY), i16::MAX);
        assert_eq!(state.axes.get(AxisFlags::RightStickX), i16::MIN);
        assert_eq!(state.axes.get(AxisFlags::RightStickY), i16::MIN);
        assert_eq!(state.axes.get(AxisFlags::L2), 255);
        assert_eq!(state.axes.get(AxisFlags::R2), 0);
        assert!(state.buttons.get(ButtonFlags::L2Full));
    }

    #[test]
    fn test_hat_diagonal() {
        assert_eq!(hat_directions(31500), [true, false, false, true]);
        assert_eq!(hat_directions(9000), [false, true, false, false]);
        assert_eq!(hat_directions(0xFFFF), [false; 4]);
    }

    #[test]
    fn test_digital_trigger_sets_full_pull() {
        let mut state = ControllerState::new();
        let data = report([CENTRE, CENTRE, CENTRE, CENTRE, 0, 0], 1 << 7, 0xFFFF);
        must(DInputDecoder::new().decode(&data, &mut state));
        assert!(state.buttons.get(ButtonFlags::R2Full));
        assert!(!state.buttons.get(ButtonFlags::R2Soft));
    }

    #[test]
    fn test_uninitialised_state_is_dropped() {
        let mut state = ControllerState::new();
        let data = report([0, 0, 0, 32767, 32767, 32767], 1, 0);
        let result = DInputDecoder::new().decode(&data, &mut state);
        assert!(matches!(result, Err(TransportError::Other(_))));
        assert!(state.buttons.is_empty());
    }
}
