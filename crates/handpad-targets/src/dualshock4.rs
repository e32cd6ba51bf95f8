//! DualShock 4 extended input report (`DS4_REPORT_EX`, 63 bytes).
//!
//! | offset | field |
//! |---|---|
//! | 0 | LX, LY, RX, RY (unsigned, centre 128, Y down) |
//! | 4 | `wButtons`, low nibble is the D-Pad direction |
//! | 6 | special buttons (PS, touchpad click) |
//! | 7 | left, right trigger |
//! | 9 | timestamp, 10 µs units |
//! | 11 | battery level |
//! | 12 | gyro X, Y, Z (i16) |
//! | 18 | accel X, Y, Z (i16) |
//! | 29 | battery level special |
//! | 32 | touch packet count |
//! | 33 | current touch packet |
//! | 42 | previous touch packets |

use std::time::Duration;

use handpad_hid_common::ReportBuilder;
use handpad_input::{
    AxisFlags, ButtonFlags, ButtonState, ControllerState, SensorSpec, Vector3,
    normalize_xbox_input, saturate_i16,
};

use crate::bus::TargetKind;
use crate::target::ReportPacker;
use crate::xbox360::trigger_byte;

pub const REPORT_LEN: usize = 63;

pub const TOUCHPAD_WIDTH: i32 = 1920;
pub const TOUCHPAD_HEIGHT: i32 = 943;

/// Counter byte plus two points of four bytes each.
pub const TOUCH_PACKET_LEN: usize = 9;

const NOT_TOUCHING: u8 = 0x80;
const BATTERY_LEVEL_SPECIAL: u8 = 11;
/// Timestamp ticks are 10 µs.
const TIMESTAMP_UNIT_MICROS: u128 = 10;

mod offsets {
    pub const THUMB_LX: usize = 0;
    pub const THUMB_LY: usize = 1;
    pub const THUMB_RX: usize = 2;
    pub const THUMB_RY: usize = 3;
    pub const BUTTONS: usize = 4;
    pub const SPECIAL: usize = 6;
    pub const TRIGGER_L: usize = 7;
    pub const TRIGGER_R: usize = 8;
    pub const TIMESTAMP: usize = 9;
    pub const GYRO: usize = 12;
    pub const ACCEL: usize = 18;
    pub const BATTERY_SPECIAL: usize = 29;
    pub const TOUCH_PACKETS: usize = 32;
    pub const CURRENT_TOUCH: usize = 33;
    pub const PREVIOUS_TOUCH: usize = 42;
}

pub mod buttons {
    pub const SQUARE: u16 = 1 << 4;
    pub const CROSS: u16 = 1 << 5;
    pub const CIRCLE: u16 = 1 << 6;
    pub const TRIANGLE: u16 = 1 << 7;
    pub const SHOULDER_LEFT: u16 = 1 << 8;
    pub const SHOULDER_RIGHT: u16 = 1 << 9;
    pub const TRIGGER_LEFT: u16 = 1 << 10;
    pub const TRIGGER_RIGHT: u16 = 1 << 11;
    pub const SHARE: u16 = 1 << 12;
    pub const OPTIONS: u16 = 1 << 13;
    pub const THUMB_LEFT: u16 = 1 << 14;
    pub const THUMB_RIGHT: u16 = 1 << 15;

    pub const SPECIAL_PS: u8 = 1 << 0;
    pub const SPECIAL_TOUCHPAD: u8 = 1 << 1;
}

const BUTTON_MAP: [(ButtonFlags, u16); 10] = [
    (ButtonFlags::B1, buttons::CROSS),
    (ButtonFlags::B2, buttons::CIRCLE),
    (ButtonFlags::B3, buttons::SQUARE),
    (ButtonFlags::B4, buttons::TRIANGLE),
    (ButtonFlags::Start, buttons::OPTIONS),
    (ButtonFlags::Back, buttons::SHARE),
    (ButtonFlags::LeftStickClick, buttons::THUMB_LEFT),
    (ButtonFlags::RightStickClick, buttons::THUMB_RIGHT),
    (ButtonFlags::L1, buttons::SHOULDER_LEFT),
    (ButtonFlags::R1, buttons::SHOULDER_RIGHT),
];

/// Buttons the report can carry, including the D-Pad, the special byte
/// and the touchpad contacts.
pub fn reported_buttons() -> impl Iterator<Item = ButtonFlags> {
    BUTTON_MAP.iter().map(|(flag, _)| *flag).chain([
        ButtonFlags::DPadUp,
        ButtonFlags::DPadDown,
        ButtonFlags::DPadLeft,
        ButtonFlags::DPadRight,
        ButtonFlags::Special,
        ButtonFlags::LeftPadClick,
        ButtonFlags::RightPadClick,
        ButtonFlags::LeftPadTouch,
        ButtonFlags::RightPadTouch,
    ])
}

/// D-Pad direction as carried in the low nibble of `wButtons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DPad {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    None = 8,
}

impl DPad {
    /// Diagonals win over the cardinal directions they contain.
    pub fn from_buttons(state: &ButtonState) -> Self {
        let up = state.get(ButtonFlags::DPadUp);
        let down = state.get(ButtonFlags::DPadDown);
        let left = state.get(ButtonFlags::DPadLeft);
        let right = state.get(ButtonFlags::DPadRight);

        if up && left {
            DPad::NorthWest
        } else if up && right {
            DPad::NorthEast
        } else if down && left {
            DPad::SouthWest
        } else if down && right {
            DPad::SouthEast
        } else if up {
            DPad::North
        } else if down {
            DPad::South
        } else if left {
            DPad::West
        } else if right {
            DPad::East
        } else {
            DPad::None
        }
    }

    pub const fn value(self) -> u16 {
        self as u16
    }
}

/// `wButtons` without the D-Pad nibble.
pub fn button_mask(state: &ControllerState) -> u16 {
    let mut mask = BUTTON_MAP
        .iter()
        .filter(|(flag, _)| state.buttons.get(*flag))
        .fold(0, |mask, (_, bit)| mask | bit);
    if state.axes.get(AxisFlags::L2) > 0 {
        mask |= buttons::TRIGGER_LEFT;
    }
    if state.axes.get(AxisFlags::R2) > 0 {
        mask |= buttons::TRIGGER_RIGHT;
    }
    mask
}

pub fn special_mask(state: &ButtonState) -> u8 {
    let mut special = 0;
    if state.get(ButtonFlags::Special) {
        special |= buttons::SPECIAL_PS;
    }
    if state.get(ButtonFlags::LeftPadClick) || state.get(ButtonFlags::RightPadClick) {
        special |= buttons::SPECIAL_TOUCHPAD;
    }
    special
}

/// One motion axis in report units, truncated toward zero.
pub fn motion_axis(value: f32, spec: SensorSpec) -> i16 {
    saturate_i16(spec.apply(value).trunc())
}

/// Timestamp increment for a tick of length `delta`.
pub fn timestamp_units(delta: Duration) -> u16 {
    u16::try_from(delta.as_micros() / TIMESTAMP_UNIT_MICROS).unwrap_or(u16::MAX)
}

/// Pad axis to touchpad X, 0 on the left.
pub fn touch_x(axis: i16) -> u16 {
    let x = (i32::from(axis) + i32::from(i16::MAX)) * TOUCHPAD_WIDTH / i32::from(u16::MAX);
    u16::try_from(x.clamp(0, 0x0FFF)).unwrap_or_default()
}

/// Pad axis to touchpad Y, 0 at the top.
pub fn touch_y(axis: i16) -> u16 {
    let y = (i32::from(i16::MAX) - i32::from(axis)) * TOUCHPAD_HEIGHT / i32::from(u16::MAX);
    u16::try_from(y.clamp(0, 0x0FFF)).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    /// 7-bit tracking number, bumped on every new contact.
    pub tracking: u8,
    pub active: bool,
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    /// Tracking byte, then 12-bit X and 12-bit Y packed into three bytes.
    pub fn encode(&self) -> [u8; 4] {
        let mut tracking = self.tracking & !NOT_TOUCHING;
        if !self.active {
            tracking |= NOT_TOUCHING;
        }
        let [x_lo, x_hi] = (self.x & 0x0FFF).to_le_bytes();
        let [y_lo, _] = (self.y & 0x0FFF).to_le_bytes();
        let [y_hi, _] = ((self.y & 0x0FFF) >> 4).to_le_bytes();
        [tracking, x_lo, (x_hi & 0x0F) | (y_lo << 4), y_hi]
    }
}

const PADS: [(ButtonFlags, AxisFlags, AxisFlags); 2] = [
    (ButtonFlags::LeftPadTouch, AxisFlags::LeftPadX, AxisFlags::LeftPadY),
    (ButtonFlags::RightPadTouch, AxisFlags::RightPadX, AxisFlags::RightPadY),
];

/// Two-finger touch state fed from the left and right pads.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    points: [TouchPoint; 2],
    packet_counter: u8,
    next_tracking: u8,
    previous: [u8; TOUCH_PACKET_LEN],
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchTracker {
    pub fn new() -> Self {
        let mut tracker = Self {
            points: [TouchPoint::default(); 2],
            packet_counter: 0,
            next_tracking: 0,
            previous: [0; TOUCH_PACKET_LEN],
        };
        tracker.previous = tracker.current();
        tracker
    }

    pub fn points(&self) -> &[TouchPoint; 2] {
        &self.points
    }

    pub fn packet_counter(&self) -> u8 {
        self.packet_counter
    }

    pub fn update(&mut self, state: &ControllerState) {
        let before = self.current();

        for (point, (touch, x_axis, y_axis)) in self.points.iter_mut().zip(PADS) {
            let touching = state.buttons.get(touch);
            if touching && !point.active {
                self.packet_counter = self.packet_counter.wrapping_add(1);
                point.tracking = self.next_tracking;
                self.next_tracking = self.next_tracking.wrapping_add(1) & !NOT_TOUCHING;
                point.active = true;
            } else if !touching && point.active {
                point.active = false;
            }

            if touching {
                point.x = touch_x(state.axes.get(x_axis));
                point.y = touch_y(state.axes.get(y_axis));
            }
        }

        if self.current() != before {
            self.previous = before;
        }
    }

    pub fn current(&self) -> [u8; TOUCH_PACKET_LEN] {
        let [first, second] = &self.points;
        let [t1, a1, b1, c1] = first.encode();
        let [t2, a2, b2, c2] = second.encode();
        [self.packet_counter, t1, a1, b1, c1, t2, a2, b2, c2]
    }

    pub fn previous(&self) -> [u8; TOUCH_PACKET_LEN] {
        self.previous
    }
}

#[derive(Debug, Clone)]
pub struct DualShock4Packer {
    timestamp: u16,
    touch: TouchTracker,
    report: Vec<u8>,
}

impl Default for DualShock4Packer {
    fn default() -> Self {
        Self::new()
    }
}

impl DualShock4Packer {
    pub fn new() -> Self {
        Self {
            timestamp: 0,
            touch: TouchTracker::new(),
            report: vec![0u8; REPORT_LEN],
        }
    }

    pub fn timestamp(&self) -> u16 {
        self.timestamp
    }

    pub fn touch(&self) -> &TouchTracker {
        &self.touch
    }

    fn put_motion(builder: &mut ReportBuilder, offset: usize, value: Vector3, spec: SensorSpec) {
        builder
            .put_i16_le(offset, motion_axis(value.x, spec))
            .put_i16_le(offset + 2, motion_axis(value.y, spec))
            .put_i16_le(offset + 4, motion_axis(value.z, spec));
    }
}

fn thumb(value: i16) -> u8 {
    normalize_xbox_input(f32::from(value))
}

fn inverted_thumb(value: i16) -> u8 {
    u8::MAX.saturating_sub(thumb(value))
}

impl ReportPacker for DualShock4Packer {
    fn kind(&self) -> TargetKind {
        TargetKind::DualShock4
    }

    fn pack(&mut self, state: &ControllerState, delta: Duration) -> &[u8] {
        self.touch.update(state);
        self.timestamp = self.timestamp.wrapping_add(timestamp_units(delta));

        let axes = &state.axes;
        let wbuttons = button_mask(state) | DPad::from_buttons(&state.buttons).value();

        let mut builder = ReportBuilder::new(REPORT_LEN);
        builder
            .put_u8(offsets::THUMB_LX, thumb(axes.get(AxisFlags::LeftStickX)))
            .put_u8(offsets::THUMB_LY, inverted_thumb(axes.get(AxisFlags::LeftStickY)))
            .put_u8(offsets::THUMB_RX, thumb(axes.get(AxisFlags::RightStickX)))
            .put_u8(offsets::THUMB_RY, inverted_thumb(axes.get(AxisFlags::RightStickY)))
            .put_u16_le(offsets::BUTTONS, wbuttons)
            .put_u8(offsets::SPECIAL, special_mask(&state.buttons))
            .put_u8(offsets::TRIGGER_L, trigger_byte(axes.get(AxisFlags::L2)))
            .put_u8(offsets::TRIGGER_R, trigger_byte(axes.get(AxisFlags::R2)))
            .put_u16_le(offsets::TIMESTAMP, self.timestamp)
            .put_u8(offsets::BATTERY_SPECIAL, BATTERY_LEVEL_SPECIAL)
            .put_u8(offsets::TOUCH_PACKETS, 1)
            .put_bytes(offsets::CURRENT_TOUCH, &self.touch.current())
            .put_bytes(offsets::PREVIOUS_TOUCH, &self.touch.previous());
        Self::put_motion(&mut builder, offsets::GYRO, state.gyro.gyroscope, SensorSpec::DS4_GYRO);
        Self::put_motion(&mut builder, offsets::ACCEL, state.gyro.accelerometer, SensorSpec::DS4_ACCEL);

        self.report = builder.into_inner();
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dpad(pressed: &[ButtonFlags]) -> DPad {
        DPad::from_buttons(&pressed.iter().copied().collect())
    }

    #[test]
    fn test_dpad_diagonal_priority() {
        assert_eq!(
            dpad(&[ButtonFlags::DPadUp, ButtonFlags::DPadLeft]),
            DPad::NorthWest
        );
        assert_eq!(
            dpad(&[ButtonFlags::DPadDown, ButtonFlags::DPadRight]),
            DPad::SouthEast
        );
        assert_eq!(dpad(&[ButtonFlags::DPadLeft]), DPad::West);
        assert_eq!(dpad(&[]), DPad::None);
        // Up and left win over everything else held at the same time.
        assert_eq!(
            dpad(&[
                ButtonFlags::DPadUp,
                ButtonFlags::DPadLeft,
                ButtonFlags::DPadRight,
                ButtonFlags::DPadDown
            ]),
            DPad::NorthWest
        );
    }

    #[test]
    fn test_trigger_bits_follow_analog_value() {
        let mut state = ControllerState::new();
        state.axes.set(AxisFlags::R2, 1);
        assert_eq!(button_mask(&state), buttons::TRIGGER_RIGHT);
    }

    #[test]
    fn test_touch_point_encoding() {
        let point = TouchPoint {
            tracking: 5,
            active: true,
            x: 0x0ABC,
            y: 0x0123,
        };
        assert_eq!(point.encode(), [0x05, 0xBC, 0x3A, 0x12]);

        let lifted = TouchPoint {
            active: false,
            ..point
        };
        let [tracking, ..] = lifted.encode();
        assert_eq!(tracking, 0x85);
    }

    #[test]
    fn test_touch_coordinates_span_the_pad() {
        assert_eq!(touch_x(i16::MIN), 0);
        assert_eq!(touch_x(i16::MAX), 1919);
        assert_eq!(touch_y(i16::MAX), 0);
        assert_eq!(touch_y(i16::MIN), 943);
    }

    #[test]
    fn test_new_contact_bumps_counter_and_tracking() {
        let mut tracker = TouchTracker::new();
        let mut state = ControllerState::new();
        state.buttons.set(ButtonFlags::LeftPadTouch, true);

        tracker.update(&state);
        assert_eq!(tracker.packet_counter(), 1);
        let [left, right] = tracker.points();
        assert!(left.active);
        assert!(!right.active);

        state.buttons.set(ButtonFlags::LeftPadTouch, false);
        tracker.update(&state);
        let [left, _] = tracker.points();
        assert!(!left.active);
        assert_eq!(tracker.packet_counter(), 1);

        state.buttons.set(ButtonFlags::LeftPadTouch, true);
        tracker.update(&state);
        let [left, _] = tracker.points();
        assert_eq!(tracker.packet_counter(), 2);
        assert_eq!(left.tracking, 1);
    }

    #[test]
    fn test_timestamp_wraps() {
        let mut packer = DualShock4Packer::new();
        let state = ControllerState::new();
        for _ in 0..66 {
            packer.pack(&state, Duration::from_millis(10));
        }
        // 66 * 1000 = 66000, wrapped past u16::MAX.
        assert_eq!(packer.timestamp(), 464);
    }

    #[test]
    fn test_motion_at_rest_is_zero() {
        assert_eq!(motion_axis(0.0, SensorSpec::DS4_GYRO), 0);
        assert_eq!(motion_axis(0.0, SensorSpec::DS4_ACCEL), 0);
        assert_eq!(motion_axis(2000.0, SensorSpec::DS4_GYRO), i16::MAX);
    }
}
