//! Steam Deck built-in controller.
//!
//! Input reports are 64 bytes little-endian; only type `0x01` carries
//! input. Offsets used here:
//!
//! | offset | field |
//! |---|---|
//! | 0 | packet type |
//! | 8 | button bytes 0-6 |
//! | 16 | left pad X, Y, right pad X, Y |
//! | 24 | accelerometer X, Y, Z |
//! | 30 | gyro pitch, yaw, roll |
//! | 44 | left trigger, right trigger |
//! | 48 | left stick X, Y, right stick X, Y |
//!
//! Haptics go out as one feature report per pad.

use handpad_errors::{TransportError, TransportResult};
use handpad_hid_common::{ReportBuilder, ReportParser};
use handpad_input::{AxisFlags, ButtonFlags, ControllerState, Vector3};

use crate::decoder::{ControllerKind, ReportDecoder, Vibration};
use crate::gamepad::{Pad, Stick, pad_click_directions, stick_direction_buttons, trigger_buttons};

pub const REPORT_LEN: usize = 64;
/// Bytes up to and including the pad pressure fields.
pub const MIN_REPORT_LEN: usize = 60;
pub const PACKET_TYPE_INPUT: u8 = 0x01;

const ACCEL_RANGE_G: f32 = 2.0;
const GYRO_RANGE_DPS: f32 = 2000.0;

/// `(byte offset, bit, button)` for every digital input.
/// Full-pull bits 0 and 1 of byte 8 are ignored; pull buttons come from the
/// analog triggers.
const BUTTON_MAP: [(usize, u8, ButtonFlags); 25] = [
    (8, 2, ButtonFlags::R1),
    (8, 3, ButtonFlags::L1),
    (8, 4, ButtonFlags::B4),
    (8, 5, ButtonFlags::B2),
    (8, 6, ButtonFlags::B3),
    (8, 7, ButtonFlags::B1),
    (9, 0, ButtonFlags::DPadUp),
    (9, 1, ButtonFlags::DPadRight),
    (9, 2, ButtonFlags::DPadLeft),
    (9, 3, ButtonFlags::DPadDown),
    (9, 4, ButtonFlags::Back),
    (9, 5, ButtonFlags::Special),
    (9, 6, ButtonFlags::Start),
    (9, 7, ButtonFlags::L5),
    (10, 0, ButtonFlags::R5),
    (10, 1, ButtonFlags::LeftPadClick),
    (10, 2, ButtonFlags::RightPadTouch),
    (10, 3, ButtonFlags::LeftPadTouch),
    (10, 4, ButtonFlags::RightPadClick),
    (10, 6, ButtonFlags::LeftStickClick),
    (11, 2, ButtonFlags::RightStickClick),
    (13, 1, ButtonFlags::L4),
    (13, 2, ButtonFlags::R4),
    (13, 6, ButtonFlags::LeftStickTouch),
    (13, 7, ButtonFlags::RightStickTouch),
];

const QUICK_ACCESS: (usize, u8) = (14, 2);

/// Raw trigger (0-32767) to 0-255.
pub fn trigger_value(raw: i16) -> i16 {
    let max = i32::from(i16::MAX);
    let scaled = i32::from(raw).clamp(0, max).saturating_mul(255) / max;
    i16::try_from(scaled).unwrap_or(255)
}

fn scaled(raw: i16, range: f32) -> f32 {
    f32::from(raw) / f32::from(i16::MAX) * range
}

#[derive(Debug, Default)]
pub struct NeptuneDecoder;

impl NeptuneDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportDecoder for NeptuneDecoder {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Neptune
    }

    fn report_len(&self) -> usize {
        REPORT_LEN
    }

    fn decode(&mut self, report: &[u8], state: &mut ControllerState) -> TransportResult {
        let parser = ReportParser::new(report);
        parser.require(MIN_REPORT_LEN)?;

        let packet_type = parser.u8_at(0)?;
        if packet_type != PACKET_TYPE_INPUT {
            return Err(TransportError::other(format!(
                "not an input packet: {packet_type:#04x}"
            )));
        }

        for (offset, bit, button) in BUTTON_MAP {
            state.buttons.set(button, parser.bit_at(offset, bit)?);
        }
        let (offset, bit) = QUICK_ACCESS;
        state.buttons.set(ButtonFlags::OEM1, parser.bit_at(offset, bit)?);

        state.axes.set(AxisFlags::LeftStickX, parser.i16_le_at(48)?);
        state.axes.set(AxisFlags::LeftStickY, parser.i16_le_at(50)?);
        state.axes.set(AxisFlags::RightStickX, parser.i16_le_at(52)?);
        state.axes.set(AxisFlags::RightStickY, parser.i16_le_at(54)?);
        state.axes.set(AxisFlags::L2, trigger_value(parser.i16_le_at(44)?));
        state.axes.set(AxisFlags::R2, trigger_value(parser.i16_le_at(46)?));

        // Pad coordinates are only meaningful while touched.
        let left_touch = state.buttons.get(ButtonFlags::LeftPadTouch);
        let right_touch = state.buttons.get(ButtonFlags::RightPadTouch);
        let pad = |touched: bool, offset: usize| -> TransportResult<i16> {
            if touched {
                parser.i16_le_at(offset)
            } else {
                Ok(0)
            }
        };
        state.axes.set(AxisFlags::LeftPadX, pad(left_touch, 16)?);
        state.axes.set(AxisFlags::LeftPadY, pad(left_touch, 18)?);
        state.axes.set(AxisFlags::RightPadX, pad(right_touch, 20)?);
        state.axes.set(AxisFlags::RightPadY, pad(right_touch, 22)?);

        trigger_buttons(state);
        stick_direction_buttons(state, Stick::Left);
        stick_direction_buttons(state, Stick::Right);
        pad_click_directions(state, Pad::Left);
        pad_click_directions(state, Pad::Right);

        let (accel_x, accel_y, accel_z) = (
            parser.i16_le_at(24)?,
            parser.i16_le_at(26)?,
            parser.i16_le_at(28)?,
        );
        let (gyro_pitch, gyro_yaw, gyro_roll) = (
            parser.i16_le_at(30)?,
            parser.i16_le_at(32)?,
            parser.i16_le_at(34)?,
        );

        state.gyro.accelerometer = -Vector3::new(
            scaled(accel_x, ACCEL_RANGE_G),
            scaled(accel_z, ACCEL_RANGE_G),
            scaled(accel_y, ACCEL_RANGE_G),
        );
        state.gyro.gyroscope = Vector3::new(
            -scaled(gyro_roll, GYRO_RANGE_DPS),
            -scaled(gyro_yaw, GYRO_RANGE_DPS),
            scaled(gyro_pitch, GYRO_RANGE_DPS),
        );
        Ok(())
    }
}

pub const HAPTIC_PACKET_TYPE: u8 = 0xEA;
pub const HAPTIC_PACKET_LEN: usize = 15;
const HAPTIC_STYLE_WEAK: u8 = 1;
const MIN_INTENSITY_DB: f32 = -2.0;
const MAX_INTENSITY_DB: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HapticPad {
    Left = 0,
    Right = 1,
}

/// Pad intensity for one motor value, `None` when the motor is off.
pub fn haptic_intensity(value: u8, strength: f32) -> Option<i8> {
    if value == 0 {
        return None;
    }
    let db = MIN_INTENSITY_DB
        + (MAX_INTENSITY_DB - MIN_INTENSITY_DB) * f32::from(value) * strength.clamp(0.0, 1.0)
            / f32::from(u8::MAX);
    let intensity = (db - 5.0).trunc().clamp(f32::from(i8::MIN), f32::from(i8::MAX));
    Some(intensity as i8)
}

fn haptic_report(pad: HapticPad, intensity: i8, timestamp_ms: u32) -> Vec<u8> {
    let mut report = ReportBuilder::new(HAPTIC_PACKET_LEN);
    report
        .put_u8(0, HAPTIC_PACKET_TYPE)
        .put_u8(1, 0x0D)
        .put_u8(2, pad as u8)
        .put_u8(3, HAPTIC_STYLE_WEAK)
        .put_u8(4, 0x00)
        .put_bytes(5, &intensity.to_le_bytes())
        .put_u8(6, 0x04)
        .put_bytes(7, &timestamp_ms.to_le_bytes())
        .put_bytes(11, &timestamp_ms.to_le_bytes());
    report.into_inner()
}

/// Large motor drives the left pad, small motor the right one.
pub fn haptic_reports(vibration: Vibration, strength: f32, timestamp_ms: u32) -> Vec<Vec<u8>> {
    [
        (HapticPad::Left, vibration.large),
        (HapticPad::Right, vibration.small),
    ]
    .into_iter()
    .filter_map(|(pad, value)| {
        haptic_intensity(value, strength).map(|i| haptic_report(pad, i, timestamp_ms))
    })
    .collect()
}
