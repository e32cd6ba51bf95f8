//! Press-timing state machine shared by every digital action.
//!
//! A press is either passed straight through (`long_press_ms == 0`) or timed:
//! the down edge is swallowed and the timer counts up each tick until the
//! release (short press) or the hold threshold (long press) decides the
//! outcome. A successful press is replayed as a fresh rising edge in the same
//! tick so toggle logic sees it. Toggle and turbo then shape the final value.

use serde::{Deserialize, Serialize};

/// Which hold duration fires the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PressType {
    /// Fires on release before `long_press_ms`
    #[default]
    Short,
    /// Fires once the button has been held for `long_press_ms`
    Long,
}

/// Configuration half of a timed press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PressConfig {
    pub press_type: PressType,
    /// Zero disables timing
    pub long_press_ms: u32,
    pub toggle: bool,
    pub turbo: bool,
    pub turbo_delay_ms: u32,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            press_type: PressType::Short,
            long_press_ms: 0,
            toggle: false,
            turbo: false,
            turbo_delay_ms: 30,
        }
    }
}

/// Runtime half of a timed press. Never copied when a layout is duplicated.
#[derive(Debug, Default)]
pub struct PressState {
    value: bool,
    prev_value: bool,
    /// `None` while idle, elapsed milliseconds since key-down while awaiting
    press_timer: Option<u32>,
    is_toggled: bool,
    is_turboed: bool,
    turbo_idx: u32,
    turbo_bucket: Option<u32>,
}

impl PressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical output after the last step.
    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_awaiting(&self) -> bool {
        self.press_timer.is_some()
    }

    /// Elapsed time since key-down, or -1 while idle.
    pub fn press_timer(&self) -> i64 {
        self.press_timer.map_or(-1, i64::from)
    }

    pub fn is_toggled(&self) -> bool {
        self.is_toggled
    }

    pub fn is_turboed(&self) -> bool {
        self.is_turboed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance one tick with the physical button level `value`.
    pub fn step(&mut self, config: &PressConfig, value: bool, period_ms: u32) -> bool {
        let mut value = value;

        if config.long_press_ms > 0 {
            let long = config.long_press_ms;
            match self.press_timer {
                None => {
                    if value && !self.prev_value {
                        self.press_timer = Some(0);
                        self.prev_value = true;
                        return self.value;
                    }
                }
                Some(elapsed) => {
                    let elapsed = elapsed.saturating_add(period_ms);
                    self.press_timer = Some(elapsed);

                    let failed = !value
                        && match config.press_type {
                            PressType::Short => elapsed >= long,
                            PressType::Long => elapsed < long,
                        };
                    if failed {
                        self.press_timer = None;
                        self.prev_value = false;
                        return self.value;
                    }

                    let succeeded = match config.press_type {
                        PressType::Short => !value && elapsed < long,
                        PressType::Long => value && elapsed >= long,
                    };
                    if !succeeded {
                        return self.value;
                    }

                    self.press_timer = None;
                    self.prev_value = false;
                    value = true;
                }
            }
        }

        if config.toggle {
            if self.prev_value != value && value {
                self.is_toggled = !self.is_toggled;
            }
        } else {
            self.is_toggled = false;
        }

        if config.turbo && (value || self.is_toggled) {
            let bucket = self.turbo_idx / config.turbo_delay_ms.max(1);
            if self.turbo_bucket != Some(bucket) {
                self.is_turboed = !self.is_turboed;
                self.turbo_bucket = Some(bucket);
            }
            self.turbo_idx = self.turbo_idx.saturating_add(period_ms);
        } else {
            self.is_turboed = false;
            self.turbo_idx = 0;
            self.turbo_bucket = None;
        }

        self.prev_value = value;

        self.value = match (config.toggle, config.turbo) {
            (true, true) => self.is_toggled && self.is_turboed,
            (true, false) => self.is_toggled,
            (false, true) => self.is_turboed,
            (false, false) => value,
        };
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: u32 = 10;

    fn timed(press_type: PressType) -> PressConfig {
        PressConfig {
            press_type,
            long_press_ms: 450,
            ..PressConfig::default()
        }
    }

    /// Hold for `held_ticks` ticks after the down edge, then release.
    /// Returns the value observed on every tick including the release.
    fn press(config: &PressConfig, held_ticks: u32) -> Vec<bool> {
        let mut state = PressState::new();
        let mut out = vec![state.step(config, true, PERIOD)];
        for _ in 0..held_ticks {
            out.push(state.step(config, true, PERIOD));
        }
        out.push(state.step(config, false, PERIOD));
        out.push(state.step(config, false, PERIOD));
        out
    }

    fn rising_edges(values: &[bool]) -> usize {
        let mut prev = false;
        let mut n = 0;
        for &v in values {
            if v && !prev {
                n += 1;
            }
            prev = v;
        }
        n
    }

    #[test]
    fn test_passthrough_without_timing() {
        let config = PressConfig::default();
        let mut state = PressState::new();
        assert!(state.step(&config, true, PERIOD));
        assert!(!state.step(&config, false, PERIOD));
        assert_eq!(state.press_timer(), -1);
    }

    #[test]
    fn test_down_edge_is_swallowed_while_timing() {
        let config = timed(PressType::Short);
        let mut state = PressState::new();
        assert!(!state.step(&config, true, PERIOD));
        assert!(state.is_awaiting());
        assert_eq!(state.press_timer(), 0);
    }

    #[test]
    fn test_short_press_fires_on_quick_release() {
        let values = press(&timed(PressType::Short), 10);
        assert_eq!(rising_edges(&values), 1);
    }

    #[test]
    fn test_short_press_fails_when_held_past_threshold() {
        // release lands exactly on the 450ms tick: failure
        let values = press(&timed(PressType::Short), 44);
        assert_eq!(rising_edges(&values), 0);
        let values = press(&timed(PressType::Short), 60);
        assert_eq!(rising_edges(&values), 0);
    }

    #[test]
    fn test_short_press_last_tick_before_threshold_fires() {
        let values = press(&timed(PressType::Short), 43);
        assert_eq!(rising_edges(&values), 1);
    }

    #[test]
    fn test_long_press_fails_on_early_release() {
        let values = press(&timed(PressType::Long), 20);
        assert_eq!(rising_edges(&values), 0);
    }

    #[test]
    fn test_long_press_fires_once_at_boundary_tick() {
        let config = timed(PressType::Long);
        let mut state = PressState::new();
        assert!(!state.step(&config, true, PERIOD));
        for tick in 1..45 {
            assert!(!state.step(&config, true, PERIOD), "fired early at tick {tick}");
        }
        // 45 * 10ms = 450ms: boundary counts as success
        assert!(state.step(&config, true, PERIOD));
        assert!(!state.is_awaiting());
        // keeps holding without a new edge
        assert!(state.step(&config, true, PERIOD));
        assert!(!state.step(&config, false, PERIOD));
    }

    #[test]
    fn test_toggle_flips_once_per_press() {
        let config = PressConfig {
            toggle: true,
            ..PressConfig::default()
        };
        let mut state = PressState::new();
        assert!(state.step(&config, true, PERIOD));
        assert!(state.step(&config, false, PERIOD));
        assert!(state.step(&config, false, PERIOD));
        assert!(!state.step(&config, true, PERIOD));
        assert!(!state.step(&config, false, PERIOD));
    }

    #[test]
    fn test_toggle_with_short_press_uses_synthetic_edge() {
        let config = PressConfig {
            toggle: true,
            ..timed(PressType::Short)
        };
        let mut state = PressState::new();
        state.step(&config, true, PERIOD);
        state.step(&config, true, PERIOD);
        assert!(state.step(&config, false, PERIOD));
        assert!(state.is_toggled());
        assert!(state.step(&config, false, PERIOD));
    }

    #[test]
    fn test_turbo_flips_every_delay() {
        let config = PressConfig {
            turbo: true,
            turbo_delay_ms: 30,
            ..PressConfig::default()
        };
        let mut state = PressState::new();
        let values: Vec<bool> = (0..9).map(|_| state.step(&config, true, PERIOD)).collect();
        assert_eq!(
            values,
            vec![true, true, true, false, false, false, true, true, true]
        );
        assert!(!state.step(&config, false, PERIOD));
        assert!(!state.is_turboed());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let config = timed(PressType::Long);
        let mut state = PressState::new();
        state.step(&config, true, PERIOD);
        state.reset();
        assert_eq!(state.press_timer(), -1);
        assert!(!state.value());
    }
}
