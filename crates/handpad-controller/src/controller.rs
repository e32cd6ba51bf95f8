//! One physical controller and its tick.
//!
//! Each tick reads the newest raw report under the HID lock, decodes it into
//! a fresh [`ControllerState`], lays the injected buttons over it and finally
//! fills in motion from the platform sensors when the controller has no IMU
//! of its own. Transport failures are classified and handled in place; only
//! a fatal one changes what the caller sees.

use std::sync::Arc;

use handpad_devices::InjectedButtons;
use handpad_errors::{Recovery, Result, TransportError, TransportFault, ValidationError};
use handpad_hid_common::{HidDeviceInfo, Transport};
use handpad_input::{ButtonState, ControllerState, GyroState};
use handpad_sensors::ImuReader;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::decoder::{ControllerKind, ReportDecoder, Vibration};
use crate::rumble::{RumbleConfig, RumbleWorker};

/// The per-controller HID lock. Reads, re-attaches and rumble writes all go
/// through it.
pub type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

pub const DEFAULT_READ_TIMEOUT_MS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ControllerConfig {
    /// Longest a tick waits for a report.
    pub read_timeout_ms: u32,
    /// Rumble scale, 0-1.
    pub vibration_strength: f32,
    pub rumble: RumbleConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            vibration_strength: 1.0,
            rumble: RumbleConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.read_timeout_ms > 100 {
            return Err(ValidationError::out_of_range(
                "read_timeout_ms",
                self.read_timeout_ms,
                0,
                100,
            ));
        }
        if !(0.0..=1.0).contains(&self.vibration_strength) {
            return Err(ValidationError::out_of_range(
                "vibration_strength",
                self.vibration_strength,
                0.0,
                1.0,
            ));
        }
        self.rumble.validate()
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new state was decoded.
    Updated,
    /// A transient fault was handled; the previous state stands.
    Recovered(Recovery),
    /// The read was dropped; the previous state stands.
    Skipped,
    /// The controller is gone and its state was reset.
    Disconnected,
}

/// Platform motion sensors for controllers without an IMU.
#[derive(Debug)]
pub struct MotionSensors {
    pub gyrometer: ImuReader,
    pub accelerometer: ImuReader,
}

impl MotionSensors {
    pub fn new(gyrometer: ImuReader, accelerometer: ImuReader) -> Self {
        Self {
            gyrometer,
            accelerometer,
        }
    }

    fn poll(&mut self, rate_hz: f64) -> GyroState {
        GyroState::new(
            self.accelerometer.poll(rate_hz),
            self.gyrometer.poll(rate_hz),
        )
    }

    fn reset(&mut self) {
        self.gyrometer.reset();
        self.accelerometer.reset();
    }
}

pub struct Controller {
    name: String,
    kind: ControllerKind,
    decoder: Box<dyn ReportDecoder>,
    hid: SharedTransport,
    injected: InjectedButtons,
    state: ControllerState,
    scratch: ControllerState,
    buffer: Vec<u8>,
    motion: Option<MotionSensors>,
    config: ControllerConfig,
    rumble: Option<RumbleWorker>,
    plugged: bool,
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("plugged", &self.plugged)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn new(kind: ControllerKind, transport: Box<dyn Transport>, config: ControllerConfig) -> Self {
        let name = transport.info().display_name();
        let decoder = kind.decoder();
        let buffer = vec![0u8; decoder.report_len()];
        Self {
            name,
            kind,
            decoder,
            hid: Arc::new(Mutex::new(transport)),
            injected: InjectedButtons::new(),
            state: ControllerState::new(),
            scratch: ControllerState::new(),
            buffer,
            motion: None,
            config,
            rumble: None,
            plugged: false,
        }
    }

    /// Take motion from platform sensors instead of the report.
    #[must_use]
    pub fn with_motion(mut self, motion: MotionSensors) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn info(&self) -> HidDeviceInfo {
        self.hid.lock().info().clone()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Buttons pressed on behalf of macros and chords.
    pub fn injected(&self) -> &InjectedButtons {
        &self.injected
    }

    /// State after the last successful tick.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_plugged(&self) -> bool {
        self.plugged
    }

    /// Acquire the device and start the rumble worker.
    ///
    /// # Errors
    ///
    /// Transport errors from acquiring the device, or an I/O error if the
    /// rumble thread cannot be spawned.
    pub fn plug(&mut self) -> Result<()> {
        if self.plugged {
            return Ok(());
        }
        self.hid.lock().acquire()?;
        self.rumble = Some(RumbleWorker::spawn(
            self.name.clone(),
            self.kind,
            Arc::clone(&self.hid),
            self.config.rumble,
            self.config.vibration_strength,
        )?);
        self.plugged = true;
        info!(controller = %self.name, kind = %self.kind, "controller plugged");
        Ok(())
    }

    /// Stop rumble, close the device and reset state.
    pub fn unplug(&mut self) {
        if !self.plugged {
            return;
        }
        self.teardown();
        self.hid.lock().close();
        info!(controller = %self.name, "controller unplugged");
    }

    pub fn set_vibration(&self, vibration: Vibration) {
        if let Some(rumble) = &self.rumble {
            rumble.set_vibration(vibration);
        }
    }

    /// Run one tick at `rate_hz` ticks per second.
    pub fn tick(&mut self, rate_hz: f64) -> TickOutcome {
        if !self.plugged {
            return TickOutcome::Disconnected;
        }

        let read = self
            .hid
            .lock()
            .read_report(&mut self.buffer, self.config.read_timeout_ms);

        let outcome = match read {
            Ok(len) => self.decode(len),
            Err(e) => self.recover(&e),
        };

        if outcome != TickOutcome::Disconnected
            && let Some(motion) = &mut self.motion
        {
            self.state.gyro = motion.poll(rate_hz);
        }
        outcome
    }

    fn decode(&mut self, len: usize) -> TickOutcome {
        let report = self.buffer.get(..len).unwrap_or_default();
        self.scratch.clear();
        if let Err(e) = self.decoder.decode(report, &mut self.scratch) {
            return self.recover(&e);
        }

        let injected: ButtonState = self.injected.snapshot();
        ButtonState::overwrite(&injected, &mut self.scratch.buttons);
        core::mem::swap(&mut self.state, &mut self.scratch);
        TickOutcome::Updated
    }

    fn recover(&mut self, error: &TransportError) -> TickOutcome {
        match error.classify() {
            TransportFault::Transient(recovery) => {
                debug!(controller = %self.name, error = %error, ?recovery, "recovering transport");
                let mut hid = self.hid.lock();
                let result = match recovery {
                    Recovery::Reacquire => hid.acquire(),
                    Recovery::Reattach => hid.reattach(),
                };
                if let Err(e) = result {
                    debug!(controller = %self.name, error = %e, "recovery failed, retrying next tick");
                }
                TickOutcome::Recovered(recovery)
            }
            TransportFault::Ignored => {
                trace!(controller = %self.name, error = %error, "dropping read");
                TickOutcome::Skipped
            }
            TransportFault::Fatal => {
                info!(controller = %self.name, error = %error, "controller disconnected");
                self.teardown();
                TickOutcome::Disconnected
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut rumble) = self.rumble.take() {
            rumble.stop();
        }
        self.plugged = false;
        self.state = ControllerState::new();
        self.scratch = ControllerState::new();
        self.injected.clear();
        if let Some(motion) = &mut self.motion {
            motion.reset();
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.unplug();
    }
}
