//! Absolute-deadline tick scheduling.
//!
//! Each wake time is the previous deadline plus one period, never "now plus
//! one period", so sleep overshoot does not accumulate into drift. The last
//! stretch before a deadline is spun rather than slept.

use std::time::{Duration, Instant};

use handpad_errors::ValidationError;
use serde::{Deserialize, Serialize};

use crate::jitter::JitterMetrics;

pub const MIN_PERIOD_MS: u64 = 3;
pub const MAX_PERIOD_MS: u64 = 10;
pub const DEFAULT_PERIOD_MS: u64 = 10;

/// How long before a deadline sleeping gives way to spinning.
const SPIN_MARGIN: Duration = Duration::from_micros(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TickConfig {
    /// Tick period in milliseconds.
    pub period_ms: u64,
    /// Spin the final stretch before each deadline for tighter wakeups.
    pub spin_tail: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            spin_tail: true,
        }
    }
}

impl TickConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_PERIOD_MS..=MAX_PERIOD_MS).contains(&self.period_ms) {
            return Err(ValidationError::out_of_range(
                "tick.period_ms",
                self.period_ms,
                MIN_PERIOD_MS,
                MAX_PERIOD_MS,
            ));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// One timer tick as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// 1 for the first tick.
    pub index: u64,
    /// Nominal period.
    pub period: Duration,
    /// Measured time since the previous tick.
    pub delta: Duration,
}

impl Tick {
    /// Nominal tick rate in Hz.
    pub fn rate_hz(&self) -> f64 {
        let secs = self.period.as_secs_f64();
        if secs <= 0.0 { 0.0 } else { secs.recip() }
    }

    pub fn period_ms(&self) -> u64 {
        u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug)]
pub struct AbsoluteScheduler {
    period: Duration,
    spin_tail: bool,
    next_tick: Instant,
    last_tick: Option<Instant>,
    tick_count: u64,
    metrics: JitterMetrics,
}

impl AbsoluteScheduler {
    pub fn new(config: &TickConfig) -> Self {
        let period = config.period().max(Duration::from_millis(1));
        Self {
            period,
            spin_tail: config.spin_tail,
            next_tick: Instant::now(),
            last_tick: None,
            tick_count: 0,
            metrics: JitterMetrics::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &JitterMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut JitterMetrics {
        &mut self.metrics
    }

    /// Block until the next deadline and return the tick.
    ///
    /// A caller that fell more than a whole period behind is resynchronised
    /// to now instead of firing a burst of catch-up ticks.
    pub fn wait_for_tick(&mut self) -> Tick {
        let start = Instant::now();
        let missed = start >= self.next_tick;
        let jitter = if missed {
            start.duration_since(self.next_tick)
        } else {
            self.next_tick.duration_since(start)
        };
        self.metrics
            .record_tick(u64::try_from(jitter.as_nanos()).unwrap_or(u64::MAX), missed);

        if !missed {
            self.sleep_until(self.next_tick);
        }

        let now = Instant::now();
        let delta = self
            .last_tick
            .map_or(self.period, |last| now.duration_since(last));
        self.last_tick = Some(now);

        self.next_tick += self.period;
        if now.saturating_duration_since(self.next_tick) > self.period {
            self.next_tick = now + self.period;
        }

        self.tick_count = self.tick_count.saturating_add(1);
        Tick {
            index: self.tick_count,
            period: self.period,
            delta,
        }
    }

    fn sleep_until(&self, target: Instant) {
        let now = Instant::now();
        if target <= now {
            return;
        }
        let remaining = target.duration_since(now);
        if !self.spin_tail {
            std::thread::sleep(remaining);
            return;
        }
        if remaining > SPIN_MARGIN {
            std::thread::sleep(remaining.saturating_sub(SPIN_MARGIN));
        }
        while Instant::now() < target {
            std::hint::spin_loop();
        }
    }

    pub fn reset(&mut self) {
        self.next_tick = Instant::now();
        self.last_tick = None;
        self.tick_count = 0;
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_bounds() {
        assert_eq!(TickConfig::default().validate(), Ok(()));
        for period_ms in [2, 11] {
            let config = TickConfig {
                period_ms,
                ..TickConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_ticks_are_numbered_from_one() {
        let mut scheduler = AbsoluteScheduler::new(&TickConfig {
            period_ms: 3,
            spin_tail: false,
        });
        let first = scheduler.wait_for_tick();
        let second = scheduler.wait_for_tick();
        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert_eq!(first.delta, Duration::from_millis(3));
        assert!(second.delta >= Duration::from_millis(2));
    }

    #[test]
    fn test_ticks_do_not_drift() {
        let config = TickConfig {
            period_ms: 3,
            spin_tail: true,
        };
        let mut scheduler = AbsoluteScheduler::new(&config);
        let start = Instant::now();
        for _ in 0..20 {
            scheduler.wait_for_tick();
        }
        // The first tick fires immediately, the other 19 wait a period each.
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(scheduler.tick_count(), 20);
    }

    #[test]
    fn test_rate_hz() {
        let tick = Tick {
            index: 1,
            period: Duration::from_millis(10),
            delta: Duration::from_millis(10),
        };
        assert!((tick.rate_hz() - 100.0).abs() < 1e-9);
        assert_eq!(tick.period_ms(), 10);
    }

    #[test]
    fn test_reset() {
        let mut scheduler = AbsoluteScheduler::new(&TickConfig::default());
        scheduler.wait_for_tick();
        scheduler.reset();
        assert_eq!(scheduler.tick_count(), 0);
        assert_eq!(scheduler.metrics().total_ticks, 0);
    }
}
