//! Range mapping and small input conversions shared by drivers and targets.

use serde::{Deserialize, Serialize};

/// Linear remap of `value` from `[old_min, old_max]` to `[new_min, new_max]`.
///
/// The result is not clamped. A degenerate source range maps everything to
/// `new_min`.
pub fn map_range(value: f32, old_min: f32, old_max: f32, new_min: f32, new_max: f32) -> f32 {
    let old_span = old_max - old_min;
    if old_span == 0.0 {
        return new_min;
    }
    new_min + (new_max - new_min) * (value - old_min) / old_span
}

/// Fixed linear conversion between a device unit range and an output range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub min_in: f32,
    pub max_in: f32,
    pub min_out: f32,
    pub max_out: f32,
}

impl SensorSpec {
    pub const fn new(min_in: f32, max_in: f32, min_out: f32, max_out: f32) -> Self {
        Self {
            min_in,
            max_in,
            min_out,
            max_out,
        }
    }

    /// Raw signed 16-bit counts to g, one g per half range.
    pub const RAW_ACCEL_1G: SensorSpec = SensorSpec::new(-32768.0, 32768.0, -1.0, 1.0);

    /// Accelerometer, ±2 g to the full signed 16-bit range.
    pub const DS4_ACCEL: SensorSpec = SensorSpec::new(-2.0, 2.0, -32768.0, 32767.0);

    /// Gyroscope, ±2000 deg/s to the full signed 16-bit range.
    pub const DS4_GYRO: SensorSpec = SensorSpec::new(-2000.0, 2000.0, -32768.0, 32767.0);

    pub fn apply(&self, value: f32) -> f32 {
        range_map(value, self)
    }
}

/// Apply a [`SensorSpec`] to one reading.
pub fn range_map(value: f32, spec: &SensorSpec) -> f32 {
    map_range(value, spec.min_in, spec.max_in, spec.min_out, spec.max_out)
}

/// Signed 16-bit stick value to the unsigned byte DS4 expects, centre 128.
pub fn normalize_xbox_input(input: f32) -> u8 {
    let input = input.clamp(f32::from(i16::MIN), f32::from(i16::MAX));
    let output = input / f32::from(u16::MAX) * f32::from(u8::MAX) + f32::from(u8::MAX) / 2.0;
    output.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Round to nearest and saturate to `i16`. NaN maps to 0.
pub fn saturate_i16(value: f32) -> i16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Round to nearest and saturate to `u8`. NaN maps to 0.
pub fn saturate_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Split a touch position into up/right/down/left.
///
/// Positions closer than `radius` to the centre press nothing. Otherwise the
/// circle is cut into eight 45° sectors centred on the four cardinal and four
/// diagonal directions (angle 0 points along +y); `radial_shift` rotates
/// the sectors in degrees.
pub fn touch_to_directions(x: i32, y: i32, radius: i32, radial_shift: i32) -> [bool; 4] {
    let mut buttons = [false; 4];

    let (fx, fy) = (x as f32, y as f32);
    if fx.hypot(fy) < radius as f32 {
        return buttons;
    }

    let angle = (fx.atan2(fy).to_degrees() + 22.5) as i32;
    let angle = angle.saturating_add(radial_shift).rem_euclid(360);

    let [up, right, down, left] = &mut buttons;
    match angle / 45 {
        0 => *up = true,
        1 => {
            *up = true;
            *right = true;
        }
        2 => *right = true,
        3 => {
            *right = true;
            *down = true;
        }
        4 => *down = true,
        5 => {
            *down = true;
            *left = true;
        }
        6 => *left = true,
        _ => {
            *left = true;
            *up = true;
        }
    }
    buttons
}
