//! The tick thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::bus::TickBus;
use crate::error::{SchedulerError, SchedulerResult};
use crate::jitter::JitterMetrics;
use crate::scheduler::{AbsoluteScheduler, TickConfig};

const THREAD_NAME: &str = "handpad-tick";

/// Drives a [`TickBus`] from a dedicated thread at a fixed period.
#[derive(Debug)]
pub struct TickTimer {
    config: TickConfig,
    bus: Arc<TickBus>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<JitterMetrics>>,
}

impl TickTimer {
    pub fn new(config: TickConfig, bus: Arc<TickBus>) -> Self {
        Self {
            config,
            bus,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    pub fn bus(&self) -> &Arc<TickBus> {
        &self.bus
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Spawn the tick thread.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] if started twice, or the spawn
    /// failure from the OS.
    pub fn start(&mut self) -> SchedulerResult {
        if self.thread.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let bus = Arc::clone(&self.bus);
        let config = self.config;

        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || {
                let mut scheduler = AbsoluteScheduler::new(&config);
                while running.load(Ordering::Acquire) {
                    let tick = scheduler.wait_for_tick();
                    bus.dispatch(&tick);
                }
                scheduler.metrics().clone()
            });

        match spawned {
            Ok(handle) => {
                info!(period_ms = self.config.period_ms, "tick timer started");
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(SchedulerError::Spawn(e))
            }
        }
    }

    /// Stop the tick thread and return its jitter statistics.
    ///
    /// The tick in flight finishes first. Returns `None` if the timer was
    /// not running or the thread panicked.
    pub fn stop(&mut self) -> Option<JitterMetrics> {
        let handle = self.thread.take()?;
        self.running.store(false, Ordering::Release);

        match handle.join() {
            Ok(mut metrics) => {
                let p99_jitter_us = metrics.p99_jitter_ns() / 1_000;
                info!(
                    ticks = metrics.total_ticks,
                    missed = metrics.missed_ticks,
                    p99_jitter_us,
                    "tick timer stopped"
                );
                Some(metrics)
            }
            Err(_panic) => {
                error!("tick thread panicked");
                None
            }
        }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Stage;
    use crate::scheduler::Tick;
    use handpad_test_helpers::{must, must_some};
    use parking_lot::Mutex;
    use std::time::Duration;

    fn fast() -> TickConfig {
        TickConfig {
            period_ms: 3,
            spin_tail: false,
        }
    }

    #[test]
    fn test_timer_dispatches_until_stopped() {
        let bus = Arc::new(TickBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe("probe", Stage::Read, move |tick: &Tick| {
            sink.lock().push(tick.index)
        });

        let mut timer = TickTimer::new(fast(), Arc::clone(&bus));
        must(timer.start());
        assert!(timer.is_running());
        thread::sleep(Duration::from_millis(40));
        let metrics = must_some(timer.stop(), "timer was running");

        let seen = seen.lock().clone();
        assert!(seen.len() >= 2, "only {} ticks", seen.len());
        assert_eq!(seen.first(), Some(&1));
        assert!(seen.windows(2).all(|w| matches!(w, [a, b] if b == &(a + 1))));
        assert_eq!(metrics.total_ticks, seen.len() as u64);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut timer = TickTimer::new(fast(), Arc::new(TickBus::new()));
        must(timer.start());
        assert!(matches!(timer.start(), Err(SchedulerError::AlreadyRunning)));
        assert!(timer.stop().is_some());
        assert!(timer.stop().is_none());
    }
}
