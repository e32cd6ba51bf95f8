//! Layouts: which actions run for which physical input.
//!
//! [`Layout`] is the serializable mapping table. [`LayoutEngine`] owns one
//! runtime action per configured slot and turns a physical
//! [`ControllerState`] into the logical output state once per tick.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use handpad_errors::ValidationError;
use handpad_input::{
    AxisChannels, AxisFlags, AxisLayoutFlags, AxisState, ButtonFlags, ButtonState,
    ControllerState, Vector2, saturate_i16,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{ActionContext, AnalogAction, AxisActions, ButtonActions, TriggerActions};
use crate::config::{AxisActionConfig, AxisMapping, ButtonActionConfig, TriggerActionConfig};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    #[serde(default)]
    pub buttons: BTreeMap<ButtonFlags, Vec<ButtonActionConfig>>,
    #[serde(default)]
    pub axes: BTreeMap<AxisLayoutFlags, Vec<AxisMapping>>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed input mapped to itself.
    pub fn identity(
        buttons: &[ButtonFlags],
        sticks: &[AxisLayoutFlags],
        triggers: &[AxisLayoutFlags],
    ) -> Self {
        let mut layout = Self::new();
        for &button in buttons {
            layout.set_button(button, vec![ButtonActionConfig::new(button)]);
        }
        for &axis in sticks {
            layout.set_axis(axis, vec![AxisMapping::Axis(AxisActionConfig::new(axis))]);
        }
        for &axis in triggers {
            layout.set_axis(
                axis,
                vec![AxisMapping::Trigger(TriggerActionConfig::new(axis))],
            );
        }
        layout
    }

    /// Handheld defaults on top of an identity layout: pad clicks drive the
    /// D-Pad and right stick click, the right pad also drives the right stick.
    #[must_use]
    pub fn with_handheld_defaults(mut self) -> Self {
        let pad_buttons = [
            (ButtonFlags::LeftPadClickUp, ButtonFlags::DPadUp),
            (ButtonFlags::LeftPadClickDown, ButtonFlags::DPadDown),
            (ButtonFlags::LeftPadClickLeft, ButtonFlags::DPadLeft),
            (ButtonFlags::LeftPadClickRight, ButtonFlags::DPadRight),
            (ButtonFlags::RightPadClick, ButtonFlags::RightStickClick),
        ];
        for (source, target) in pad_buttons {
            self.buttons
                .entry(source)
                .or_default()
                .push(ButtonActionConfig::new(target));
        }
        self.axes
            .entry(AxisLayoutFlags::RightPad)
            .or_default()
            .push(AxisMapping::Axis(AxisActionConfig::new(
                AxisLayoutFlags::RightStick,
            )));
        self
    }

    /// Replace the actions on `button`. Long presses are ordered first.
    pub fn set_button(&mut self, button: ButtonFlags, mut actions: Vec<ButtonActionConfig>) {
        long_presses_first(&mut actions);
        self.buttons.insert(button, actions);
    }

    pub fn remove_button(&mut self, button: ButtonFlags) {
        self.buttons.remove(&button);
    }

    pub fn set_axis(&mut self, axis: AxisLayoutFlags, actions: Vec<AxisMapping>) {
        self.axes.insert(axis, actions);
    }

    pub fn remove_axis(&mut self, axis: AxisLayoutFlags) {
        self.axes.remove(&axis);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for actions in self.buttons.values() {
            for action in actions {
                action.validate()?;
            }
        }
        for (source, actions) in &self.axes {
            if *source == AxisLayoutFlags::Gyroscope {
                return Err(ValidationError::constraint(
                    "gyroscope is not an analog axis source",
                ));
            }
            for action in actions {
                action.validate()?;
            }
        }
        Ok(())
    }
}

/// Stable, so equal press types keep their listed order.
fn long_presses_first(actions: &mut [ButtonActionConfig]) {
    actions.sort_by_key(|a| Reverse(a.press.press_type));
}

/// Runtime form of a [`Layout`].
pub struct LayoutEngine {
    buttons: Vec<(ButtonFlags, Vec<ButtonActions>)>,
    axes: Vec<(AxisLayoutFlags, Vec<AnalogAction>)>,
}

impl LayoutEngine {
    /// Validate `layout` and build fresh runtime actions for it.
    ///
    /// Long-press actions on a source run before its short-press ones,
    /// whatever order the layout lists them in.
    pub fn new(layout: &Layout) -> Result<Self, ValidationError> {
        layout.validate()?;
        let buttons = layout
            .buttons
            .iter()
            .map(|(&source, actions)| {
                let mut configs = actions.clone();
                long_presses_first(&mut configs);
                (
                    source,
                    configs.into_iter().map(ButtonActions::new).collect(),
                )
            })
            .collect();
        let axes = layout
            .axes
            .iter()
            .map(|(&source, actions)| {
                (
                    source,
                    actions.iter().map(AnalogAction::from_mapping).collect(),
                )
            })
            .collect();
        debug!(
            buttons = layout.buttons.len(),
            axes = layout.axes.len(),
            "layout engine built"
        );
        Ok(Self { buttons, axes })
    }

    /// The configuration this engine runs, rebuilt from its actions.
    pub fn layout(&self) -> Layout {
        let mut layout = Layout::new();
        for (source, actions) in &self.buttons {
            layout
                .buttons
                .insert(*source, actions.iter().map(|a| *a.config()).collect());
        }
        for (source, actions) in &self.axes {
            layout
                .axes
                .insert(*source, actions.iter().map(AnalogAction::mapping).collect());
        }
        layout
    }

    pub fn reset(&mut self) {
        for (_, actions) in &mut self.buttons {
            actions.iter_mut().for_each(ButtonActions::reset);
        }
        for (_, actions) in &mut self.axes {
            actions.iter_mut().for_each(AnalogAction::reset);
        }
    }

    /// Run every action once and compose the logical output state.
    ///
    /// Buttons without a mapping are dropped. Several actions writing the
    /// same output are combined: buttons OR, sticks add with saturation,
    /// triggers take the larger value. Motion data passes through.
    pub fn apply(&mut self, input: &ControllerState, ctx: &ActionContext) -> ControllerState {
        let mut output = ControllerState {
            buttons: ButtonState::new(),
            axes: AxisState::new(),
            gyro: input.gyro,
        };

        for (source, actions) in &mut self.buttons {
            let pressed = input.buttons.get(*source);
            for action in actions.iter_mut() {
                if action.execute(pressed, ctx) {
                    output.buttons.set(action.config().button, true);
                }
            }
        }

        for (source, actions) in &mut self.axes {
            let (vector, scalar) = read_source(&input.axes, *source);
            for action in actions.iter_mut() {
                match action {
                    AnalogAction::Axis(a) => {
                        let v = a.execute(vector, ctx);
                        write_vector(&mut output.axes, a, v);
                    }
                    AnalogAction::Trigger(t) => {
                        let v = t.execute(scalar, ctx);
                        write_trigger(&mut output.axes, t, v);
                    }
                }
            }
        }

        output
    }
}

fn read_source(axes: &AxisState, source: AxisLayoutFlags) -> (Vector2, i16) {
    match source.channels() {
        AxisChannels::Dual { x, y } => {
            let vx = axes.get(x);
            let vy = axes.get(y);
            (Vector2::new(f32::from(vx), f32::from(vy)), vx)
        }
        AxisChannels::Single(a) => {
            let v = axes.get(a);
            (Vector2::new(f32::from(v), 0.0), v)
        }
        AxisChannels::None => (Vector2::ZERO, 0),
    }
}

fn write_vector(axes: &mut AxisState, action: &AxisActions, v: Vector2) {
    if let AxisChannels::Dual { x, y } = action.config().axis.channels() {
        add_saturating(axes, x, saturate_i16(v.x));
        add_saturating(axes, y, saturate_i16(v.y));
    }
}

fn write_trigger(axes: &mut AxisState, action: &TriggerActions, v: u8) {
    if let AxisChannels::Single(a) = action.config().axis.channels() {
        let current = axes.get(a);
        axes.set(a, current.max(i16::from(v)));
    }
}

fn add_saturating(axes: &mut AxisState, axis: AxisFlags, value: i16) {
    let current = axes.get(axis);
    axes.set(axis, current.saturating_add(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::press::{PressConfig, PressType};
    use handpad_test_helpers::must;

    fn xbox_like() -> Layout {
        Layout::identity(
            &[ButtonFlags::B1, ButtonFlags::B2, ButtonFlags::DPadUp],
            &[AxisLayoutFlags::LeftStick, AxisLayoutFlags::RightStick],
            &[AxisLayoutFlags::L2, AxisLayoutFlags::R2],
        )
    }

    #[test]
    fn test_identity_passes_buttons_and_axes() {
        let mut engine = must(LayoutEngine::new(&xbox_like()));
        let mut input = ControllerState::new();
        input.buttons.set(ButtonFlags::B1, true);
        input.axes.set(AxisFlags::LeftStickX, -1234);
        input.axes.set(AxisFlags::R2, 200);

        let out = engine.apply(&input, &ActionContext::new(10));
        assert!(out.buttons.get(ButtonFlags::B1));
        assert!(!out.buttons.get(ButtonFlags::B2));
        assert_eq!(out.axes.get(AxisFlags::LeftStickX), -1234);
        assert_eq!(out.axes.get(AxisFlags::R2), 200);
    }

    #[test]
    fn test_engine_orders_long_presses_first_for_loaded_layouts() {
        let short = ButtonActionConfig::new(ButtonFlags::B2);
        let mut long = ButtonActionConfig::new(ButtonFlags::B3);
        long.press = PressConfig {
            press_type: PressType::Long,
            long_press_ms: 450,
            ..PressConfig::default()
        };
        // Listed as a config file would list it, bypassing set_button.
        let mut layout = Layout::new();
        layout.buttons.insert(ButtonFlags::B1, vec![short, long]);

        let engine = must(LayoutEngine::new(&layout));
        let rebuilt = engine.layout();
        let order: Vec<_> = rebuilt
            .buttons
            .get(&ButtonFlags::B1)
            .map(|actions| actions.iter().map(|a| a.button).collect())
            .unwrap_or_default();
        assert_eq!(order, vec![ButtonFlags::B3, ButtonFlags::B2]);
    }

    #[test]
    fn test_unmapped_buttons_are_dropped() {
        let mut engine = must(LayoutEngine::new(&xbox_like()));
        let input = ControllerState {
            buttons: ButtonState::new().with(ButtonFlags::OEM3),
            ..ControllerState::default()
        };
        let out = engine.apply(&input, &ActionContext::new(10));
        assert!(out.buttons.is_empty());
    }

    #[test]
    fn test_handheld_defaults_route_pad_clicks() {
        let layout = xbox_like().with_handheld_defaults();
        let mut engine = must(LayoutEngine::new(&layout));
        let mut input = ControllerState::new();
        input.buttons.set(ButtonFlags::LeftPadClickUp, true);
        input.axes.set(AxisFlags::RightPadX, 4000);
        input.axes.set(AxisFlags::RightStickX, 1000);

        let out = engine.apply(&input, &ActionContext::new(10));
        assert!(out.buttons.get(ButtonFlags::DPadUp));
        assert_eq!(out.axes.get(AxisFlags::RightStickX), 5000);
    }

    #[test]
    fn test_long_press_actions_sorted_first() {
        let mut layout = Layout::new();
        layout.set_button(
            ButtonFlags::B3,
            vec![
                ButtonActionConfig::new(ButtonFlags::B3),
                ButtonActionConfig::new(ButtonFlags::B4).with_press(PressConfig {
                    press_type: PressType::Long,
                    long_press_ms: 500,
                    ..PressConfig::default()
                }),
            ],
        );
        let actions = &layout.buttons[&ButtonFlags::B3];
        assert_eq!(actions.first().map(|a| a.button), Some(ButtonFlags::B4));
    }

    #[test]
    fn test_engine_round_trips_layout() {
        let layout = xbox_like().with_handheld_defaults();
        let engine = must(LayoutEngine::new(&layout));
        assert_eq!(engine.layout(), layout);
    }

    #[test]
    fn test_gyro_source_rejected() {
        let mut layout = Layout::new();
        layout.set_axis(
            AxisLayoutFlags::Gyroscope,
            vec![AxisMapping::Axis(AxisActionConfig::new(AxisLayoutFlags::RightStick))],
        );
        assert!(LayoutEngine::new(&layout).is_err());
    }
}
