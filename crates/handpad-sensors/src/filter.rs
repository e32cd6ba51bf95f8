//! One-Euro smoothing for jittery sensor sources.
//!
//! The One-Euro filter is a first-order low-pass whose cutoff rises with the
//! filtered speed of the signal: slow motion is smoothed hard, fast motion
//! passes with little lag.
//!
//! # Example
//!
//! ```
//! use handpad_input::Vector3;
//! use handpad_sensors::filter::Vector3Filter;
//!
//! let mut filter = Vector3Filter::default();
//! let first = filter.filter(Vector3::new(1.0, 0.0, 0.0), 100.0);
//! assert_eq!(first, Vector3::new(1.0, 0.0, 0.0));
//! ```

use core::f64::consts::PI;

use handpad_input::Vector3;
use serde::{Deserialize, Serialize};

/// Exponential smoothing with a per-sample alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassState {
    last: Option<f64>,
}

impl LowPassState {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// The first sample passes through unchanged.
    pub fn filter(&mut self, x: f64, alpha: f64) -> f64 {
        let out = match self.last {
            Some(prev) => alpha * x + (1.0 - alpha) * prev,
            None => x,
        };
        self.last = Some(out);
        out
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// One-Euro tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OneEuroConfig {
    /// Cutoff in Hz at zero speed.
    pub min_cutoff: f64,
    /// Cutoff increase per unit of speed.
    pub beta: f64,
    /// Cutoff used when smoothing the derivative.
    pub derivative_cutoff: f64,
}

impl OneEuroConfig {
    pub const DEFAULT_MIN_CUTOFF: f64 = 0.4;
    pub const DEFAULT_BETA: f64 = 0.2;

    pub const fn new(min_cutoff: f64, beta: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            derivative_cutoff: 1.0,
        }
    }
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_CUTOFF, Self::DEFAULT_BETA)
    }
}

fn alpha(rate: f64, cutoff: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    let te = 1.0 / rate;
    1.0 / (1.0 + tau / te)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OneEuroState {
    pub config: OneEuroConfig,
    x: LowPassState,
    dx: LowPassState,
}

impl OneEuroState {
    pub const fn new(config: OneEuroConfig) -> Self {
        Self {
            config,
            x: LowPassState::new(),
            dx: LowPassState::new(),
        }
    }

    /// Filter one sample taken at `rate` Hz.
    ///
    /// A non-positive or non-finite rate passes the sample through and
    /// leaves the state untouched.
    pub fn filter(&mut self, x: f64, rate: f64) -> f64 {
        if !(rate.is_finite() && rate > 0.0) {
            return x;
        }

        let dx = match self.x.last() {
            Some(prev) => (x - prev) * rate,
            None => 0.0,
        };
        let edx = self.dx.filter(dx, alpha(rate, self.config.derivative_cutoff));
        let cutoff = self.config.min_cutoff + self.config.beta * edx.abs();
        self.x.filter(x, alpha(rate, cutoff))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.dx.reset();
    }
}

/// Three independent One-Euro filters, one per axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector3Filter {
    axes: [OneEuroState; 3],
}

impl Vector3Filter {
    pub const fn new(config: OneEuroConfig) -> Self {
        Self {
            axes: [
                OneEuroState::new(config),
                OneEuroState::new(config),
                OneEuroState::new(config),
            ],
        }
    }

    pub fn set_config(&mut self, config: OneEuroConfig) {
        for axis in &mut self.axes {
            axis.config = config;
        }
    }

    pub fn filter(&mut self, value: Vector3, rate: f64) -> Vector3 {
        let [fx, fy, fz] = &mut self.axes;
        Vector3::new(
            fx.filter(f64::from(value.x), rate) as f32,
            fy.filter(f64::from(value.y), rate) as f32,
            fz.filter(f64::from(value.z), rate) as f32,
        )
    }

    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }
}
