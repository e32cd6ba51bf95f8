//! Thresholds shared by every decoder and the buttons derived from them.

use handpad_input::{AxisFlags, ButtonFlags, ControllerState};

/// Left stick magnitude below which no stick-direction button fires.
pub const LEFT_THUMB_DEADZONE: i16 = 7849;
/// Right stick magnitude below which no stick-direction button fires.
pub const RIGHT_THUMB_DEADZONE: i16 = 8689;
/// Trigger value (0-255) above which the soft pull button fires.
pub const TRIGGER_THRESHOLD: u8 = 30;
/// Pad coordinate beyond which a click counts as directional.
pub const TRACKPAD_INNER: i16 = 21844;

/// Which physical stick a set of direction buttons belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    fn channels(self) -> (AxisFlags, AxisFlags) {
        match self {
            Stick::Left => (AxisFlags::LeftStickX, AxisFlags::LeftStickY),
            Stick::Right => (AxisFlags::RightStickX, AxisFlags::RightStickY),
        }
    }

    fn deadzone(self) -> i16 {
        match self {
            Stick::Left => LEFT_THUMB_DEADZONE,
            Stick::Right => RIGHT_THUMB_DEADZONE,
        }
    }

    /// Up, down, left, right.
    fn buttons(self) -> [ButtonFlags; 4] {
        match self {
            Stick::Left => [
                ButtonFlags::LeftStickUp,
                ButtonFlags::LeftStickDown,
                ButtonFlags::LeftStickLeft,
                ButtonFlags::LeftStickRight,
            ],
            Stick::Right => [
                ButtonFlags::RightStickUp,
                ButtonFlags::RightStickDown,
                ButtonFlags::RightStickLeft,
                ButtonFlags::RightStickRight,
            ],
        }
    }
}

/// Set the four direction buttons of `stick` from its current axis values.
pub fn stick_direction_buttons(state: &mut ControllerState, stick: Stick) {
    let (x_axis, y_axis) = stick.channels();
    let (x, y) = (state.axes.get(x_axis), state.axes.get(y_axis));
    let deadzone = stick.deadzone();
    let [up, down, left, right] = stick.buttons();

    state.buttons.set(up, y > deadzone);
    state.buttons.set(down, y < -deadzone);
    state.buttons.set(left, x < -deadzone);
    state.buttons.set(right, x > deadzone);
}

/// Soft and full pull buttons for both triggers.
pub fn trigger_buttons(state: &mut ControllerState) {
    let full = i16::from(TRIGGER_THRESHOLD).saturating_mul(8);
    let soft = i16::from(TRIGGER_THRESHOLD);

    let l2 = state.axes.get(AxisFlags::L2);
    let r2 = state.axes.get(AxisFlags::R2);
    state.buttons.set(ButtonFlags::L2Soft, l2 > soft);
    state.buttons.set(ButtonFlags::R2Soft, r2 > soft);
    state.buttons.set(ButtonFlags::L2Full, l2 > full);
    state.buttons.set(ButtonFlags::R2Full, r2 > full);
}

/// Which touch pad a click belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    Left,
    Right,
}

/// Directional click buttons from the pad position at click time.
///
/// Vertical and horizontal are decided independently, so a corner click
/// presses two buttons.
pub fn pad_click_directions(state: &mut ControllerState, pad: Pad) {
    let (x_axis, y_axis, click, [up, down, left, right]) = match pad {
        Pad::Left => (
            AxisFlags::LeftPadX,
            AxisFlags::LeftPadY,
            ButtonFlags::LeftPadClick,
            [
                ButtonFlags::LeftPadClickUp,
                ButtonFlags::LeftPadClickDown,
                ButtonFlags::LeftPadClickLeft,
                ButtonFlags::LeftPadClickRight,
            ],
        ),
        Pad::Right => (
            AxisFlags::RightPadX,
            AxisFlags::RightPadY,
            ButtonFlags::RightPadClick,
            [
                ButtonFlags::RightPadClickUp,
                ButtonFlags::RightPadClickDown,
                ButtonFlags::RightPadClickLeft,
                ButtonFlags::RightPadClickRight,
            ],
        ),
    };

    for button in [up, down, left, right] {
        state.buttons.set(button, false);
    }
    if !state.buttons.get(click) {
        return;
    }

    let (x, y) = (state.axes.get(x_axis), state.axes.get(y_axis));
    if y >= TRACKPAD_INNER {
        state.buttons.set(up, true);
    } else if y <= -TRACKPAD_INNER {
        state.buttons.set(down, true);
    }
    if x >= TRACKPAD_INNER {
        state.buttons.set(right, true);
    } else if x <= -TRACKPAD_INNER {
        state.buttons.set(left, true);
    }
}
