//! Per-controller rumble worker.
//!
//! Vibration requests arrive from the virtual bus feedback callback at any
//! time. Each one replaces the pending value and wakes a dedicated thread
//! that writes it through the transport, so a slow USB write never delays
//! an input tick and a burst of requests collapses to the last one.
//! While a motor is on the value is rewritten every poll interval, which
//! keeps pulse-based haptics alive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use handpad_errors::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::controller::SharedTransport;
use crate::decoder::{ControllerKind, Vibration};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_JOIN_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RumbleConfig {
    pub poll_interval_ms: u64,
    pub join_timeout_ms: u64,
}

impl Default for RumbleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            join_timeout_ms: DEFAULT_JOIN_TIMEOUT_MS,
        }
    }
}

impl RumbleConfig {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !(1..=1000).contains(&self.poll_interval_ms) {
            return Err(ValidationError::out_of_range(
                "rumble.poll_interval_ms",
                self.poll_interval_ms,
                1,
                1000,
            ));
        }
        if !(1..=10_000).contains(&self.join_timeout_ms) {
            return Err(ValidationError::out_of_range(
                "rumble.join_timeout_ms",
                self.join_timeout_ms,
                1,
                10_000,
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

/// Latest requested value, taken by the worker on wakeup.
type PendingSlot = Arc<Mutex<Option<Vibration>>>;

pub struct RumbleWorker {
    name: String,
    pending: PendingSlot,
    wake: Option<Sender<()>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    /// Disconnects when the worker thread exits.
    exited: Receiver<()>,
    join_timeout: Duration,
}

impl core::fmt::Debug for RumbleWorker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RumbleWorker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

struct WorkerContext {
    kind: ControllerKind,
    hid: SharedTransport,
    strength: f32,
    poll: Duration,
    running: Arc<AtomicBool>,
    pending: PendingSlot,
    wake: Receiver<()>,
    _exit_guard: Sender<()>,
}

impl RumbleWorker {
    /// Start the worker thread for one controller.
    ///
    /// # Errors
    ///
    /// [`handpad_errors::HandpadError::Io`] if the thread cannot be spawned.
    pub fn spawn(
        name: impl Into<String>,
        kind: ControllerKind,
        hid: SharedTransport,
        config: RumbleConfig,
        strength: f32,
    ) -> Result<Self> {
        let name = name.into();
        let pending: PendingSlot = Arc::new(Mutex::new(None));
        let (wake_tx, wake_rx) = channel::bounded(1);
        let (exit_guard, exited) = channel::bounded(0);
        let running = Arc::new(AtomicBool::new(true));

        let ctx = WorkerContext {
            kind,
            hid,
            strength,
            poll: config.poll_interval(),
            running: Arc::clone(&running),
            pending: Arc::clone(&pending),
            wake: wake_rx,
            _exit_guard: exit_guard,
        };

        let thread = thread::Builder::new()
            .name(format!("rumble-{name}"))
            .spawn(move || Self::thread_main(ctx))?;

        info!(controller = %name, "rumble worker started");
        Ok(Self {
            name,
            pending,
            wake: Some(wake_tx),
            running,
            thread: Some(thread),
            exited,
            join_timeout: config.join_timeout(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Replace the pending motor value. Never blocks on the transport.
    pub fn set_vibration(&self, vibration: Vibration) {
        let Some(wake) = &self.wake else {
            return;
        };
        *self.pending.lock() = Some(vibration);
        match wake.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                trace!(controller = %self.name, "rumble worker already woken");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(controller = %self.name, "rumble worker gone");
            }
        }
    }

    /// Clear the running flag and wait up to the join timeout.
    ///
    /// Returns `true` when the thread exited in time. Otherwise it is left
    /// detached.
    pub fn stop(&mut self) -> bool {
        let Some(thread) = self.thread.take() else {
            return true;
        };

        self.running.store(false, Ordering::Release);
        self.wake = None;

        match self.exited.recv_timeout(self.join_timeout) {
            Err(RecvTimeoutError::Disconnected) | Ok(()) => match thread.join() {
                Ok(()) => {
                    info!(controller = %self.name, "rumble worker stopped");
                    true
                }
                Err(_) => {
                    error!(controller = %self.name, "rumble worker panicked");
                    false
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    controller = %self.name,
                    timeout_ms = self.join_timeout.as_millis(),
                    "rumble worker did not stop in time, detaching"
                );
                false
            }
        }
    }

    fn write(ctx: &WorkerContext, vibration: Vibration, started: Instant) {
        let elapsed = started.elapsed().as_millis() & u128::from(u32::MAX);
        let timestamp_ms = u32::try_from(elapsed).unwrap_or_default();

        let reports = ctx
            .kind
            .rumble_reports(vibration, ctx.strength, timestamp_ms);
        if reports.is_empty() {
            return;
        }

        let mut hid = ctx.hid.lock();
        for report in &reports {
            if let Err(e) = hid.write_report(report) {
                debug!(error = %e, "rumble write failed");
                return;
            }
        }
    }

    fn thread_main(ctx: WorkerContext) {
        let started = Instant::now();
        let mut current = Vibration::OFF;

        while ctx.running.load(Ordering::Acquire) {
            match ctx.wake.recv_timeout(ctx.poll) {
                Ok(()) => {
                    let next = ctx.pending.lock().take();
                    if let Some(next) = next {
                        current = next;
                        Self::write(&ctx, current, started);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !current.is_off() {
                        Self::write(&ctx, current, started);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if !current.is_off() {
            Self::write(&ctx, Vibration::OFF, started);
        }
    }
}

impl Drop for RumbleWorker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}
