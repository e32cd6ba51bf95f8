//! Sparse per-tick input state.
//!
//! [`ButtonState`] stores only pressed buttons: writing `false` removes the
//! entry, so two states compare equal exactly when the same buttons are held.
//! [`AxisState`] likewise drops zero values and reads absent channels as 0.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::flags::{AxisFlags, ButtonFlags};
use crate::vector::Vector3;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonState {
    pressed: BTreeSet<ButtonFlags>,
}

impl ButtonState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, button: ButtonFlags) -> bool {
        self.pressed.contains(&button)
    }

    pub fn set(&mut self, button: ButtonFlags, value: bool) {
        if value {
            self.pressed.insert(button);
        } else {
            self.pressed.remove(&button);
        }
    }

    #[must_use]
    pub fn with(mut self, button: ButtonFlags) -> Self {
        self.set(button, true);
        self
    }

    /// Pressed buttons in flag order.
    pub fn pressed(&self) -> impl Iterator<Item = ButtonFlags> + '_ {
        self.pressed.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// True when every button in `chord` is held.
    pub fn contains_all(&self, chord: &[ButtonFlags]) -> bool {
        !chord.is_empty() && chord.iter().all(|b| self.pressed.contains(b))
    }

    /// Write every pressed entry of `injected` over `physical`.
    ///
    /// Because only pressed buttons are stored the result is the union of
    /// both sets; injected input can add presses but never hide a physical one.
    pub fn overwrite(injected: &ButtonState, physical: &mut ButtonState) {
        for button in injected.pressed() {
            physical.set(button, true);
        }
    }
}

impl FromIterator<ButtonFlags> for ButtonState {
    fn from_iter<I: IntoIterator<Item = ButtonFlags>>(iter: I) -> Self {
        Self {
            pressed: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisState {
    values: BTreeMap<AxisFlags, i16>,
}

impl AxisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: AxisFlags) -> i16 {
        self.values.get(&axis).copied().unwrap_or(0)
    }

    pub fn set(&mut self, axis: AxisFlags, value: i16) {
        if value == 0 {
            self.values.remove(&axis);
        } else {
            self.values.insert(axis, value);
        }
    }

    #[must_use]
    pub fn with(mut self, axis: AxisFlags, value: i16) -> Self {
        self.set(axis, value);
        self
    }

    /// Non-zero channels in flag order.
    pub fn iter(&self) -> impl Iterator<Item = (AxisFlags, i16)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Write every non-zero channel of `source` over `target`.
    pub fn overwrite(source: &AxisState, target: &mut AxisState) {
        for (axis, value) in source.iter() {
            target.set(axis, value);
        }
    }
}

/// Motion sample in the canonical device frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GyroState {
    /// Acceleration in g
    pub accelerometer: Vector3,
    /// Angular velocity in degrees per second
    pub gyroscope: Vector3,
}

impl GyroState {
    pub fn new(accelerometer: Vector3, gyroscope: Vector3) -> Self {
        Self {
            accelerometer,
            gyroscope,
        }
    }
}

/// Everything one controller reports in one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    pub buttons: ButtonState,
    pub axes: AxisState,
    pub gyro: GyroState,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.buttons.clear();
        self.axes.clear();
        self.gyro = GyroState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_false_removes_entry() {
        let mut state = ButtonState::new();
        state.set(ButtonFlags::B1, true);
        assert_eq!(state.len(), 1);
        state.set(ButtonFlags::B1, false);
        assert!(state.is_empty());
        assert_eq!(state, ButtonState::new());
    }

    #[test]
    fn test_overwrite_is_union() {
        let injected = ButtonState::new().with(ButtonFlags::OEM1);
        let mut physical = ButtonState::new().with(ButtonFlags::B2);
        ButtonState::overwrite(&injected, &mut physical);
        assert!(physical.get(ButtonFlags::OEM1));
        assert!(physical.get(ButtonFlags::B2));
    }

    #[test]
    fn test_overwrite_never_releases_physical() {
        let injected = ButtonState::new();
        let mut physical = ButtonState::new().with(ButtonFlags::DPadUp);
        ButtonState::overwrite(&injected, &mut physical);
        assert!(physical.get(ButtonFlags::DPadUp));
    }

    #[test]
    fn test_axis_absent_reads_zero() {
        let mut axes = AxisState::new();
        assert_eq!(axes.get(AxisFlags::LeftStickX), 0);
        axes.set(AxisFlags::LeftStickX, -1200);
        assert_eq!(axes.get(AxisFlags::LeftStickX), -1200);
        axes.set(AxisFlags::LeftStickX, 0);
        assert_eq!(axes, AxisState::new());
    }

    #[test]
    fn test_contains_all_requires_non_empty_chord() {
        let state = ButtonState::new().with(ButtonFlags::L1).with(ButtonFlags::R1);
        assert!(state.contains_all(&[ButtonFlags::L1, ButtonFlags::R1]));
        assert!(!state.contains_all(&[ButtonFlags::L1, ButtonFlags::B1]));
        assert!(!state.contains_all(&[]));
    }
}
