//! The virtual gamepad bus seam.

use core::fmt;
use std::sync::Arc;

use handpad_errors::BusError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Which virtual controller to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    #[serde(rename = "xbox360")]
    Xbox360,
    #[serde(rename = "dualshock4")]
    DualShock4,
}

impl TargetKind {
    /// USB vendor and product id the bus presents to games.
    pub const fn usb_id(self) -> (u16, u16) {
        match self {
            TargetKind::Xbox360 => (0x045E, 0x028E),
            TargetKind::DualShock4 => (0x054C, 0x09CC),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Xbox360 => f.write_str("Xbox 360"),
            TargetKind::DualShock4 => f.write_str("DualShock 4"),
        }
    }
}

/// Opaque slot the bus hands out on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(pub u32);

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Client of the virtual bus driver.
pub trait VirtualBus: Send {
    /// Plug a new virtual controller.
    ///
    /// # Errors
    ///
    /// [`BusError::BusNotFound`] when the driver is not running.
    fn connect(&mut self, kind: TargetKind) -> Result<TargetHandle, BusError>;

    /// Unplug a virtual controller.
    ///
    /// # Errors
    ///
    /// [`BusError::InvalidTarget`] for unknown handles.
    fn disconnect(&mut self, handle: TargetHandle) -> Result<(), BusError>;

    /// Submit one packed input report.
    ///
    /// # Errors
    ///
    /// Any [`BusError`]; callers drop the report and carry on.
    fn submit(&mut self, handle: TargetHandle, report: &[u8]) -> Result<(), BusError>;
}

/// One bus shared by every target in the process.
pub type SharedBus = Arc<Mutex<Box<dyn VirtualBus>>>;

pub fn shared(bus: impl VirtualBus + 'static) -> SharedBus {
    Arc::new(Mutex::new(Box::new(bus)))
}

pub mod mock {
    //! Recording in-memory bus for tests.

    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Arc;

    use handpad_errors::BusError;
    use parking_lot::Mutex;

    use super::{TargetHandle, TargetKind, VirtualBus};

    #[derive(Debug, Default)]
    struct MockBusState {
        next_handle: u32,
        connected: BTreeMap<TargetHandle, TargetKind>,
        submitted: Vec<(TargetHandle, Vec<u8>)>,
        connect_errors: VecDeque<BusError>,
        submit_errors: VecDeque<BusError>,
    }

    /// Clones share one recording.
    #[derive(Debug, Clone, Default)]
    pub struct MockBus {
        state: Arc<Mutex<MockBusState>>,
    }

    impl MockBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next connect with `error`.
        pub fn fail_connect(&self, error: BusError) {
            self.state.lock().connect_errors.push_back(error);
        }

        /// Fail the next submit with `error`.
        pub fn fail_submit(&self, error: BusError) {
            self.state.lock().submit_errors.push_back(error);
        }

        pub fn connected(&self) -> Vec<(TargetHandle, TargetKind)> {
            self.state
                .lock()
                .connected
                .iter()
                .map(|(&handle, &kind)| (handle, kind))
                .collect()
        }

        pub fn submitted(&self) -> Vec<(TargetHandle, Vec<u8>)> {
            self.state.lock().submitted.clone()
        }

        pub fn last_report(&self) -> Option<Vec<u8>> {
            self.state
                .lock()
                .submitted
                .last()
                .map(|(_, report)| report.clone())
        }
    }

    impl VirtualBus for MockBus {
        fn connect(&mut self, kind: TargetKind) -> Result<TargetHandle, BusError> {
            let mut state = self.state.lock();
            if let Some(error) = state.connect_errors.pop_front() {
                return Err(error);
            }
            state.next_handle = state.next_handle.wrapping_add(1);
            let handle = TargetHandle(state.next_handle);
            state.connected.insert(handle, kind);
            Ok(handle)
        }

        fn disconnect(&mut self, handle: TargetHandle) -> Result<(), BusError> {
            match self.state.lock().connected.remove(&handle) {
                Some(_) => Ok(()),
                None => Err(BusError::InvalidTarget),
            }
        }

        fn submit(&mut self, handle: TargetHandle, report: &[u8]) -> Result<(), BusError> {
            let mut state = self.state.lock();
            if let Some(error) = state.submit_errors.pop_front() {
                return Err(error);
            }
            if !state.connected.contains_key(&handle) {
                return Err(BusError::InvalidTarget);
            }
            state.submitted.push((handle, report.to_vec()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBus;
    use super::*;
    use handpad_test_helpers::{must, must_err};

    #[test]
    fn test_target_kind_serde_names() {
        assert_eq!(
            must(serde_json::to_string(&TargetKind::DualShock4)),
            "\"dualshock4\""
        );
        let kind: TargetKind = must(serde_json::from_str("\"xbox360\""));
        assert_eq!(kind, TargetKind::Xbox360);
    }

    #[test]
    fn test_mock_rejects_unknown_handle() {
        let mut bus = MockBus::new();
        let handle = must(bus.connect(TargetKind::Xbox360));
        must(bus.disconnect(handle));
        assert_eq!(must_err(bus.submit(handle, &[0])), BusError::InvalidTarget);
    }
}
