//! Runtime actions: configuration plus per-slot state, executed every tick.

use handpad_input::{AxisFlags, Vector2, saturate_i16, saturate_u8};

use crate::config::{AxisActionConfig, AxisMapping, ButtonActionConfig, TriggerActionConfig};
use crate::deadzone::{
    ScreenOrientation, anti_deadzone, anti_deadzone_radial, auto_rotate, improve_circularity,
    inner_outer_deadzone, radial_inner_outer_deadzone, rotate_and_invert,
};
use crate::press::PressState;

/// Per-tick inputs every action may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub period_ms: u32,
    pub orientation: ScreenOrientation,
}

impl ActionContext {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            orientation: ScreenOrientation::Angle0,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: ScreenOrientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Last output of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionValue {
    Bool(bool),
    Axis(i16, i16),
    Trigger(u8),
}

impl ActionValue {
    pub fn is_active(self) -> bool {
        match self {
            ActionValue::Bool(v) => v,
            ActionValue::Axis(x, y) => x != 0 || y != 0,
            ActionValue::Trigger(v) => v != 0,
        }
    }
}

pub struct ButtonActions {
    config: ButtonActionConfig,
    state: PressState,
}

impl ButtonActions {
    pub fn new(config: ButtonActionConfig) -> Self {
        Self {
            config,
            state: PressState::new(),
        }
    }

    pub fn config(&self) -> &ButtonActionConfig {
        &self.config
    }

    pub fn state(&self) -> &PressState {
        &self.state
    }

    /// Fresh action with the same configuration and idle runtime state.
    pub fn duplicate(&self) -> Self {
        Self::new(self.config)
    }

    pub fn execute(&mut self, value: bool, ctx: &ActionContext) -> bool {
        self.state.step(&self.config.press, value, ctx.period_ms)
    }

    pub fn value(&self) -> ActionValue {
        ActionValue::Bool(self.state.value())
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

pub struct AxisActions {
    config: AxisActionConfig,
    value: Vector2,
}

impl AxisActions {
    pub fn new(config: AxisActionConfig) -> Self {
        Self {
            config,
            value: Vector2::ZERO,
        }
    }

    pub fn config(&self) -> &AxisActionConfig {
        &self.config
    }

    pub fn duplicate(&self) -> Self {
        Self::new(self.config)
    }

    /// Deadzone, anti-deadzone, circularity, then rotation.
    pub fn execute(&mut self, input: Vector2, ctx: &ActionContext) -> Vector2 {
        let c = &self.config;
        let mut v = radial_inner_outer_deadzone(input, c.deadzone_inner, c.deadzone_outer);
        v = anti_deadzone_radial(v, c.anti_deadzone);
        if c.improve_circularity {
            v = improve_circularity(v);
        }
        v = if c.auto_rotate {
            auto_rotate(v, ctx.orientation)
        } else {
            rotate_and_invert(v, c.rotated, c.inverted)
        };
        self.value = v;
        v
    }

    pub fn value(&self) -> ActionValue {
        ActionValue::Axis(saturate_i16(self.value.x), saturate_i16(self.value.y))
    }

    pub fn reset(&mut self) {
        self.value = Vector2::ZERO;
    }
}

pub struct TriggerActions {
    config: TriggerActionConfig,
    value: u8,
}

impl TriggerActions {
    pub fn new(config: TriggerActionConfig) -> Self {
        Self { config, value: 0 }
    }

    pub fn config(&self) -> &TriggerActionConfig {
        &self.config
    }

    pub fn duplicate(&self) -> Self {
        Self::new(self.config)
    }

    /// Deadzone over the trigger range, anti-deadzone, then inversion.
    pub fn execute(&mut self, input: i16, _ctx: &ActionContext) -> u8 {
        let c = &self.config;
        let max = f32::from(AxisFlags::L2.max_value());
        let mut v = inner_outer_deadzone(f32::from(input), c.deadzone_inner, c.deadzone_outer, max);
        if c.axis.is_trigger() {
            v = anti_deadzone(v, c.anti_deadzone, max);
        }
        if c.inverted {
            v = max - v;
        }
        self.value = saturate_u8(v);
        self.value
    }

    pub fn value(&self) -> ActionValue {
        ActionValue::Trigger(self.value)
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

/// Runtime action on an analog source.
pub enum AnalogAction {
    Axis(AxisActions),
    Trigger(TriggerActions),
}

impl AnalogAction {
    pub fn from_mapping(mapping: &AxisMapping) -> Self {
        match mapping {
            AxisMapping::Axis(c) => AnalogAction::Axis(AxisActions::new(*c)),
            AxisMapping::Trigger(c) => AnalogAction::Trigger(TriggerActions::new(*c)),
        }
    }

    pub fn mapping(&self) -> AxisMapping {
        match self {
            AnalogAction::Axis(a) => AxisMapping::Axis(*a.config()),
            AnalogAction::Trigger(t) => AxisMapping::Trigger(*t.config()),
        }
    }

    pub fn duplicate(&self) -> Self {
        Self::from_mapping(&self.mapping())
    }

    pub fn value(&self) -> ActionValue {
        match self {
            AnalogAction::Axis(a) => a.value(),
            AnalogAction::Trigger(t) => t.value(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            AnalogAction::Axis(a) => a.reset(),
            AnalogAction::Trigger(t) => t.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::press::{PressConfig, PressType};
    use handpad_input::{AxisLayoutFlags, ButtonFlags};

    #[test]
    fn test_duplicate_copies_config_not_state() {
        let config = ButtonActionConfig::new(ButtonFlags::B1).with_press(PressConfig {
            press_type: PressType::Long,
            long_press_ms: 450,
            ..PressConfig::default()
        });
        let mut original = ButtonActions::new(config);
        let ctx = ActionContext::new(10);
        original.execute(true, &ctx);
        assert!(original.state().is_awaiting());

        let copy = original.duplicate();
        assert_eq!(copy.config(), original.config());
        assert!(!copy.state().is_awaiting());
    }

    #[test]
    fn test_trigger_anti_deadzone_and_inversion() {
        let mut action = TriggerActions::new(
            TriggerActionConfig::new(AxisLayoutFlags::L2).with_anti_deadzone(20),
        );
        let ctx = ActionContext::new(10);
        assert_eq!(action.execute(0, &ctx), 0);
        assert!(action.execute(1, &ctx) >= 51);

        let mut inverted =
            TriggerActions::new(TriggerActionConfig::new(AxisLayoutFlags::R2).with_inverted(true));
        assert_eq!(inverted.execute(0, &ctx), 255);
        assert_eq!(inverted.execute(255, &ctx), 0);
    }

    #[test]
    fn test_axis_action_scenario() {
        let mut action = AxisActions::new(
            AxisActionConfig::new(AxisLayoutFlags::LeftStick).with_deadzone(10, 90),
        );
        let ctx = ActionContext::new(10);
        let full = f32::from(i16::MAX);

        let small = action.execute(Vector2::new(0.05 * full, 0.0), &ctx);
        assert!(small.is_zero());

        let half = action.execute(Vector2::new(0.0, 0.5 * full), &ctx);
        assert!(half.length() > 0.0 && half.length() < full);

        action.execute(Vector2::new(0.95 * full, 0.0), &ctx);
        assert_eq!(action.value(), ActionValue::Axis(i16::MAX, 0));
    }

    #[test]
    fn test_auto_rotate_uses_context_orientation() {
        let mut action = AxisActions::new(
            AxisActionConfig::new(AxisLayoutFlags::RightStick).with_auto_rotate(true),
        );
        let ctx = ActionContext::new(10).with_orientation(ScreenOrientation::Angle180);
        let out = action.execute(Vector2::new(100.0, -200.0), &ctx);
        assert_eq!(out, Vector2::new(-100.0, 200.0));
    }
}
