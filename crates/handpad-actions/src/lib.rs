//! Per-mapping actions for handpad layouts.
//!
//! - [`press`]: short/long press timing, toggle and turbo
//! - [`deadzone`]: stick and trigger shaping
//! - [`config`]: serializable action configuration with validation
//! - [`actions`]: runtime action slots
//! - [`layout`]: mapping tables and the per-tick layout engine

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod actions;
pub mod config;
pub mod deadzone;
pub mod layout;
pub mod press;

pub use actions::{
    ActionContext, ActionValue, AnalogAction, AxisActions, ButtonActions, TriggerActions,
};
pub use config::{AxisActionConfig, AxisMapping, ButtonActionConfig, TriggerActionConfig};
pub use deadzone::ScreenOrientation;
pub use layout::{Layout, LayoutEngine};
pub use press::{PressConfig, PressState, PressType};

pub mod prelude {
    pub use crate::actions::*;
    pub use crate::config::*;
    pub use crate::deadzone::*;
    pub use crate::layout::*;
    pub use crate::press::*;
}
