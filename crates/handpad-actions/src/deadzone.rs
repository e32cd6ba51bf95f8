//! Deadzone, anti-deadzone, circularity and rotation transforms.
//!
//! Values are in channel units: sticks and pads span the signed 16-bit
//! range, triggers 0-255. Percentages are whole numbers in `0..=100`. The
//! outer deadzone is the magnitude, in percent of full scale, at and above
//! which output saturates.

use handpad_input::{Vector2, map_range};
use serde::{Deserialize, Serialize};

const STICK_MAX: f32 = i16::MAX as f32;

/// Current screen orientation, used by auto-rotating stick actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenOrientation {
    #[default]
    Angle0,
    Angle90,
    Angle180,
    Angle270,
}

fn pct(value: u8) -> f32 {
    f32::from(value.min(100)) / 100.0
}

fn is_noop(inner: u8, outer: u8) -> bool {
    inner == 0 && outer >= 100
}

/// One-dimensional inner/outer deadzone over a signed range of `max_value`.
///
/// Zero inside the inner deadzone, `±max_value` at or beyond the outer
/// deadzone, linearly rescaled in between with the fractional part dropped.
pub fn inner_outer_deadzone(value: f32, inner: u8, outer: u8, max_value: f32) -> f32 {
    if is_noop(inner, outer) || value.is_nan() || value == 0.0 || max_value <= 0.0 {
        return value;
    }

    let inner = pct(inner);
    let outer = pct(outer);
    let magnitude = (value / max_value).abs();
    let sign = value.signum();

    if magnitude <= inner {
        0.0
    } else if magnitude >= outer {
        max_value * sign
    } else {
        (map_range(magnitude, inner, outer, 0.0, 1.0) * max_value * sign).trunc()
    }
}

/// Scaled radial inner/outer deadzone for a stick vector.
///
/// Operates on the vector length so direction is preserved.
pub fn radial_inner_outer_deadzone(value: Vector2, inner: u8, outer: u8) -> Vector2 {
    if is_noop(inner, outer) || value.is_zero() {
        return value;
    }

    let inner = pct(inner);
    let outer = pct(outer);
    let stick = value * (1.0 / STICK_MAX);
    let length = stick.length();

    if length <= inner {
        Vector2::ZERO
    } else if length >= outer {
        stick * (STICK_MAX / length)
    } else {
        let direction = stick * (1.0 / length);
        direction * (map_range(length, inner, outer, 0.0, 1.0) * STICK_MAX)
    }
}

/// Anti-deadzone for a single channel: lift the first non-zero output to
/// `percent` of full scale.
pub fn anti_deadzone(value: f32, percent: u8, max_value: f32) -> f32 {
    if percent == 0 || value == 0.0 || max_value <= 0.0 {
        return value;
    }
    let deadzone = pct(percent);
    let input = value / max_value;
    ((1.0 - deadzone) * input + deadzone) * max_value
}

/// Radial anti-deadzone for a stick vector.
pub fn anti_deadzone_radial(value: Vector2, percent: u8) -> Vector2 {
    if percent == 0 || value.is_zero() {
        return value;
    }
    let deadzone = pct(percent);
    let stick = value * (1.0 / STICK_MAX);
    let length = stick.length();
    let multiplier = ((1.0 - deadzone) * length + deadzone) / length;
    stick * (multiplier * STICK_MAX)
}

/// Cap the stick vector at unit length so diagonals do not exceed the
/// circular gate.
pub fn improve_circularity(value: Vector2) -> Vector2 {
    let stick = value * (1.0 / STICK_MAX);
    let length = stick.length();
    if length <= 1.0 {
        return value;
    }
    stick * (STICK_MAX / length)
}

/// Counter-rotate a stick vector for the current screen orientation.
pub fn auto_rotate(value: Vector2, orientation: ScreenOrientation) -> Vector2 {
    match orientation {
        ScreenOrientation::Angle0 => value,
        ScreenOrientation::Angle90 => Vector2::new(value.y, -value.x),
        ScreenOrientation::Angle180 => Vector2::new(-value.x, -value.y),
        ScreenOrientation::Angle270 => Vector2::new(-value.y, value.x),
    }
}

/// Static quarter-turn rotation and inversion.
pub fn rotate_and_invert(value: Vector2, rotated: bool, inverted: bool) -> Vector2 {
    let value = if rotated {
        Vector2::new(value.y, -value.x)
    } else {
        value
    };
    if inverted { -value } else { value }
}
