//! A virtual controller on the bus.
//!
//! [`VirtualTarget`] packs the logical state once per tick and submits it.
//! Submission failures never reach the tick loop: the report is dropped and
//! the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use handpad_actions::Layout;
use handpad_controller::Vibration;
use handpad_errors::{BusError, ErrorSeverity};
use handpad_input::{AxisLayoutFlags, ButtonFlags, ControllerState};
use tracing::{debug, error, info, warn};

use crate::bus::{SharedBus, TargetHandle, TargetKind};
use crate::dualshock4::{self, DualShock4Packer};
use crate::xbox360::{self, Xbox360Packer};

/// Packs canonical state into one target's wire report.
pub trait ReportPacker: Send {
    fn kind(&self) -> TargetKind;

    /// Build the report for this tick. `delta` is the time since the
    /// previous tick.
    fn pack(&mut self, state: &ControllerState, delta: Duration) -> &[u8];
}

impl TargetKind {
    pub fn packer(self) -> Box<dyn ReportPacker> {
        match self {
            TargetKind::Xbox360 => Box::new(Xbox360Packer::new()),
            TargetKind::DualShock4 => Box::new(DualShock4Packer::new()),
        }
    }

    /// Buttons the target's report can carry.
    pub fn buttons(self) -> Vec<ButtonFlags> {
        match self {
            TargetKind::Xbox360 => xbox360::reported_buttons().collect(),
            TargetKind::DualShock4 => dualshock4::reported_buttons().collect(),
        }
    }

    /// Every reported input mapped to itself, plus the handheld pad routes.
    ///
    /// The DualShock 4 also keeps both touchpads so their contacts reach
    /// the touch block.
    pub fn default_layout(self) -> Layout {
        let sticks: &[AxisLayoutFlags] = match self {
            TargetKind::Xbox360 => &[AxisLayoutFlags::LeftStick, AxisLayoutFlags::RightStick],
            TargetKind::DualShock4 => &[
                AxisLayoutFlags::LeftStick,
                AxisLayoutFlags::RightStick,
                AxisLayoutFlags::LeftPad,
                AxisLayoutFlags::RightPad,
            ],
        };
        Layout::identity(
            &self.buttons(),
            sticks,
            &[AxisLayoutFlags::L2, AxisLayoutFlags::R2],
        )
        .with_handheld_defaults()
    }
}

/// Receives rumble requests the game sends to the virtual controller.
pub type FeedbackHandler = Arc<dyn Fn(Vibration) + Send + Sync>;

/// What one submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Not connected; nothing was packed.
    Idle,
    /// The bus refused the report.
    Dropped,
}

pub struct VirtualTarget {
    kind: TargetKind,
    bus: SharedBus,
    handle: Option<TargetHandle>,
    packer: Box<dyn ReportPacker>,
    feedback: Option<FeedbackHandler>,
    dropped: u64,
}

impl core::fmt::Debug for VirtualTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualTarget")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

impl VirtualTarget {
    pub fn new(kind: TargetKind, bus: SharedBus) -> Self {
        Self {
            kind,
            bus,
            handle: None,
            packer: kind.packer(),
            feedback: None,
            dropped: 0,
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn handle(&self) -> Option<TargetHandle> {
        self.handle
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Reports refused by the bus since connect.
    pub fn dropped_reports(&self) -> u64 {
        self.dropped
    }

    /// Plug the virtual controller. Connecting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Whatever the bus reports; the target stays disconnected.
    pub fn connect(&mut self) -> Result<(), BusError> {
        if self.handle.is_some() {
            return Ok(());
        }
        match self.bus.lock().connect(self.kind) {
            Ok(handle) => {
                info!(target_kind = %self.kind, handle = %handle, "virtual target connected");
                self.handle = Some(handle);
                self.dropped = 0;
                self.packer = self.kind.packer();
                Ok(())
            }
            Err(e) => {
                warn!(target_kind = %self.kind, error = %e, "failed to connect virtual target");
                Err(e)
            }
        }
    }

    /// Unplug the virtual controller. Safe to call when not connected.
    pub fn disconnect(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.bus.lock().disconnect(handle) {
            Ok(()) => info!(target_kind = %self.kind, handle = %handle, "virtual target disconnected"),
            Err(e) => warn!(target_kind = %self.kind, error = %e, "failed to disconnect virtual target"),
        }
    }

    pub fn set_feedback_handler(&mut self, handler: FeedbackHandler) {
        self.feedback = Some(handler);
    }

    /// Entry point for rumble arriving from the bus.
    pub fn feedback(&self, large_motor: u8, small_motor: u8) {
        let vibration = Vibration::new(large_motor, small_motor);
        match &self.feedback {
            Some(handler) => handler(vibration),
            None => debug!(target_kind = %self.kind, ?vibration, "feedback with no handler"),
        }
    }

    /// Pack `state` and submit it.
    pub fn submit(&mut self, state: &ControllerState, delta: Duration) -> SubmitOutcome {
        let Some(handle) = self.handle else {
            return SubmitOutcome::Idle;
        };

        let report = self.packer.pack(state, delta);
        let Err(e) = self.bus.lock().submit(handle, report) else {
            return SubmitOutcome::Submitted;
        };

        self.dropped = self.dropped.saturating_add(1);
        if e.severity() == ErrorSeverity::Critical {
            error!(
                severity = "critical",
                target_kind = %self.kind,
                handle = %handle,
                error = %e,
                "virtual report dropped"
            );
        } else {
            warn!(target_kind = %self.kind, handle = %handle, error = %e, "virtual report dropped");
        }
        SubmitOutcome::Dropped
    }
}

impl Drop for VirtualTarget {
    fn drop(&mut self) {
        self.disconnect();
    }
}
