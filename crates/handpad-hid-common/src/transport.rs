//! Controller transport seam.
//!
//! A transport hands the tick loop the newest raw input report and accepts
//! output reports (rumble). Implementations classify their own failures
//! into [`TransportError`] variants so the controller can pick a recovery.

use handpad_errors::TransportResult;

use crate::HidDeviceInfo;

pub trait Transport: Send {
    fn info(&self) -> &HidDeviceInfo;

    /// Acquire the existing handle again after `NotAcquired`.
    ///
    /// # Errors
    ///
    /// Any [`handpad_errors::TransportError`]; the caller retries next tick.
    fn acquire(&mut self) -> TransportResult;

    /// Close and reopen the device after `InputLost`.
    ///
    /// # Errors
    ///
    /// Any [`handpad_errors::TransportError`]; the caller retries next tick.
    fn reattach(&mut self) -> TransportResult;

    /// Read one report into `buf`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Any [`handpad_errors::TransportError`]; see its `classify`.
    fn read_report(&mut self, buf: &mut [u8], timeout_ms: u32) -> TransportResult<usize>;

    /// # Errors
    ///
    /// Any [`handpad_errors::TransportError`].
    fn write_report(&mut self, data: &[u8]) -> TransportResult<usize>;

    fn close(&mut self);
}

pub mod mock {
    //! Scripted in-memory transport for tests.

    use std::collections::VecDeque;
    use std::sync::Arc;

    use handpad_errors::{TransportError, TransportResult};
    use parking_lot::Mutex;

    use super::Transport;
    use crate::HidDeviceInfo;

    #[derive(Debug, Default)]
    struct MockState {
        reads: VecDeque<TransportResult<Vec<u8>>>,
        /// Served whenever the script is empty.
        idle: Option<Vec<u8>>,
        writes: Vec<Vec<u8>>,
        acquires: usize,
        reattaches: usize,
        closed: bool,
    }

    /// Cloning yields another handle on the same script, so a test keeps
    /// one clone while the controller owns the other.
    #[derive(Debug, Clone)]
    pub struct MockTransport {
        info: HidDeviceInfo,
        state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        pub fn new(vendor_id: u16, product_id: u16) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, "mock"),
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        #[must_use]
        pub fn with_info(mut self, info: HidDeviceInfo) -> Self {
            self.info = info;
            self
        }

        pub fn queue_report(&self, report: impl Into<Vec<u8>>) {
            self.state.lock().reads.push_back(Ok(report.into()));
        }

        pub fn queue_error(&self, error: TransportError) {
            self.state.lock().reads.push_back(Err(error));
        }

        /// Report served once the script runs dry.
        pub fn set_idle_report(&self, report: impl Into<Vec<u8>>) {
            self.state.lock().idle = Some(report.into());
        }

        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.state.lock().writes.clone()
        }

        pub fn acquire_count(&self) -> usize {
            self.state.lock().acquires
        }

        pub fn reattach_count(&self) -> usize {
            self.state.lock().reattaches
        }

        pub fn is_closed(&self) -> bool {
            self.state.lock().closed
        }
    }

    impl Transport for MockTransport {
        fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn acquire(&mut self) -> TransportResult {
            let mut state = self.state.lock();
            state.acquires = state.acquires.saturating_add(1);
            Ok(())
        }

        fn reattach(&mut self) -> TransportResult {
            let mut state = self.state.lock();
            state.reattaches = state.reattaches.saturating_add(1);
            state.closed = false;
            Ok(())
        }

        fn read_report(&mut self, buf: &mut [u8], timeout_ms: u32) -> TransportResult<usize> {
            let mut state = self.state.lock();
            if state.closed {
                return Err(TransportError::disconnected(self.info.display_name()));
            }
            let next = match state.reads.pop_front() {
                Some(next) => next,
                None => state
                    .idle
                    .clone()
                    .ok_or(TransportError::Timeout { timeout_ms }),
            };
            let report = next?;
            let n = report.len().min(buf.len());
            if let (Some(dst), Some(src)) = (buf.get_mut(..n), report.get(..n)) {
                dst.copy_from_slice(src);
            }
            Ok(n)
        }

        fn write_report(&mut self, data: &[u8]) -> TransportResult<usize> {
            let mut state = self.state.lock();
            if state.closed {
                return Err(TransportError::disconnected(self.info.display_name()));
            }
            state.writes.push(data.to_vec());
            Ok(data.len())
        }

        fn close(&mut self) {
            self.state.lock().closed = true;
        }
    }
}
