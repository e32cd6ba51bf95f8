//! A virtual bus with no driver behind it.
//!
//! Hands out handles and accepts reports without sending them anywhere.
//! Used when no virtual gamepad driver is installed, so the rest of the
//! pipeline can still run and be observed in the logs.

use std::collections::BTreeMap;

use handpad_errors::BusError;
use handpad_targets::{TargetHandle, TargetKind, VirtualBus};
use tracing::trace;

#[derive(Debug, Default)]
pub struct LoopbackBus {
    targets: BTreeMap<TargetHandle, TargetKind>,
    next_handle: u32,
    reports: u64,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports accepted since creation.
    pub fn report_count(&self) -> u64 {
        self.reports
    }
}

impl VirtualBus for LoopbackBus {
    fn connect(&mut self, kind: TargetKind) -> Result<TargetHandle, BusError> {
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = TargetHandle(self.next_handle);
        self.targets.insert(handle, kind);
        Ok(handle)
    }

    fn disconnect(&mut self, handle: TargetHandle) -> Result<(), BusError> {
        self.targets
            .remove(&handle)
            .map(|_| ())
            .ok_or(BusError::InvalidTarget)
    }

    fn submit(&mut self, handle: TargetHandle, report: &[u8]) -> Result<(), BusError> {
        if !self.targets.contains_key(&handle) {
            return Err(BusError::InvalidTarget);
        }
        self.reports = self.reports.saturating_add(1);
        trace!(handle = %handle, len = report.len(), "loopback report");
        Ok(())
    }
}
