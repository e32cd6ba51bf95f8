//! Serializable mapping configuration.
//!
//! Configuration is plain data: duplicating a layout copies these structs and
//! builds fresh runtime actions from them, so press timers and toggle state
//! are never carried over.

use handpad_errors::ValidationError;
use handpad_input::{AxisLayoutFlags, ButtonFlags};
use serde::{Deserialize, Serialize};

use crate::press::PressConfig;

/// Longest accepted long-press threshold.
pub const MAX_LONG_PRESS_MS: u32 = 10_000;

/// A digital action writing to one output button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonActionConfig {
    pub button: ButtonFlags,
    #[serde(default)]
    pub press: PressConfig,
}

impl ButtonActionConfig {
    pub fn new(button: ButtonFlags) -> Self {
        Self {
            button,
            press: PressConfig::default(),
        }
    }

    #[must_use]
    pub fn with_press(mut self, press: PressConfig) -> Self {
        self.press = press;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.press.turbo && self.press.turbo_delay_ms == 0 {
            return Err(ValidationError::out_of_range(
                "turbo_delay_ms",
                0,
                1,
                u32::MAX,
            ));
        }
        if self.press.long_press_ms > MAX_LONG_PRESS_MS {
            return Err(ValidationError::out_of_range(
                "long_press_ms",
                self.press.long_press_ms,
                0,
                MAX_LONG_PRESS_MS,
            ));
        }
        Ok(())
    }
}

fn default_outer() -> u8 {
    100
}

/// A 2D stick or pad action writing to one output axis group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisActionConfig {
    pub axis: AxisLayoutFlags,
    #[serde(default)]
    pub deadzone_inner: u8,
    #[serde(default = "default_outer")]
    pub deadzone_outer: u8,
    #[serde(default)]
    pub anti_deadzone: u8,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub improve_circularity: bool,
    #[serde(default)]
    pub auto_rotate: bool,
}

impl AxisActionConfig {
    pub fn new(axis: AxisLayoutFlags) -> Self {
        Self {
            axis,
            deadzone_inner: 0,
            deadzone_outer: 100,
            anti_deadzone: 0,
            inverted: false,
            rotated: false,
            improve_circularity: false,
            auto_rotate: false,
        }
    }

    #[must_use]
    pub fn with_deadzone(mut self, inner: u8, outer: u8) -> Self {
        self.deadzone_inner = inner;
        self.deadzone_outer = outer;
        self
    }

    #[must_use]
    pub fn with_anti_deadzone(mut self, percent: u8) -> Self {
        self.anti_deadzone = percent;
        self
    }

    #[must_use]
    pub fn with_circularity(mut self, enabled: bool) -> Self {
        self.improve_circularity = enabled;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotated: bool, inverted: bool) -> Self {
        self.rotated = rotated;
        self.inverted = inverted;
        self
    }

    #[must_use]
    pub fn with_auto_rotate(mut self, enabled: bool) -> Self {
        self.auto_rotate = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.axis.is_trigger() || self.axis == AxisLayoutFlags::Gyroscope {
            return Err(ValidationError::constraint(format!(
                "axis action cannot target {}",
                self.axis
            )));
        }
        validate_deadzone(self.deadzone_inner, self.deadzone_outer, self.anti_deadzone)
    }
}

/// A single-channel trigger action writing to one output trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerActionConfig {
    pub axis: AxisLayoutFlags,
    #[serde(default)]
    pub deadzone_inner: u8,
    #[serde(default = "default_outer")]
    pub deadzone_outer: u8,
    #[serde(default)]
    pub anti_deadzone: u8,
    #[serde(default)]
    pub inverted: bool,
}

impl TriggerActionConfig {
    pub fn new(axis: AxisLayoutFlags) -> Self {
        Self {
            axis,
            deadzone_inner: 0,
            deadzone_outer: 100,
            anti_deadzone: 0,
            inverted: false,
        }
    }

    #[must_use]
    pub fn with_deadzone(mut self, inner: u8, outer: u8) -> Self {
        self.deadzone_inner = inner;
        self.deadzone_outer = outer;
        self
    }

    #[must_use]
    pub fn with_anti_deadzone(mut self, percent: u8) -> Self {
        self.anti_deadzone = percent;
        self
    }

    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.axis.is_trigger() {
            return Err(ValidationError::constraint(format!(
                "trigger action cannot target {}",
                self.axis
            )));
        }
        validate_deadzone(self.deadzone_inner, self.deadzone_outer, self.anti_deadzone)
    }
}

fn validate_deadzone(inner: u8, outer: u8, anti: u8) -> Result<(), ValidationError> {
    if inner > 100 {
        return Err(ValidationError::out_of_range("deadzone_inner", inner, 0, 100));
    }
    if outer > 100 {
        return Err(ValidationError::out_of_range("deadzone_outer", outer, 0, 100));
    }
    if anti > 100 {
        return Err(ValidationError::out_of_range("anti_deadzone", anti, 0, 100));
    }
    if inner >= outer {
        return Err(ValidationError::constraint(format!(
            "inner deadzone {inner}% must be below outer deadzone {outer}%"
        )));
    }
    Ok(())
}

/// One configured action on a source axis group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisMapping {
    Axis(AxisActionConfig),
    Trigger(TriggerActionConfig),
}

impl AxisMapping {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            AxisMapping::Axis(c) => c.validate(),
            AxisMapping::Trigger(c) => c.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(ButtonActionConfig::new(ButtonFlags::B1).validate(), Ok(()));
        assert_eq!(AxisActionConfig::new(AxisLayoutFlags::LeftStick).validate(), Ok(()));
        assert_eq!(TriggerActionConfig::new(AxisLayoutFlags::L2).validate(), Ok(()));
    }

    #[test]
    fn test_inverted_deadzone_rejected() {
        let config = AxisActionConfig::new(AxisLayoutFlags::LeftStick).with_deadzone(60, 40);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_out_of_range_percentage_rejected() {
        let config = TriggerActionConfig::new(AxisLayoutFlags::R2).with_anti_deadzone(150);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_turbo_needs_delay() {
        let config = ButtonActionConfig::new(ButtonFlags::B1).with_press(PressConfig {
            turbo: true,
            turbo_delay_ms: 0,
            ..PressConfig::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_kind_checked() {
        assert!(TriggerActionConfig::new(AxisLayoutFlags::LeftStick).validate().is_err());
        assert!(AxisActionConfig::new(AxisLayoutFlags::R2).validate().is_err());
    }
}
