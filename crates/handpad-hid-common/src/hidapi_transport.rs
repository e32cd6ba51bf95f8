//! [`Transport`] over a real HID device through `hidapi`.

use handpad_errors::{TransportError, TransportResult};
use hidapi::{HidApi, HidDevice};
use tracing::{debug, warn};

use crate::{HidDeviceInfo, Transport};

pub struct HidApiTransport {
    device: Option<HidDevice>,
    info: HidDeviceInfo,
}

impl core::fmt::Debug for HidApiTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HidApiTransport")
            .field("info", &self.info)
            .field("open", &self.device.is_some())
            .finish()
    }
}

fn other(err: &hidapi::HidError) -> TransportError {
    TransportError::other(err.to_string())
}

// A fresh context per open sees devices plugged in since the last one.
fn open_device(vendor_id: u16, product_id: u16) -> TransportResult<HidDevice> {
    let api = HidApi::new().map_err(|e| other(&e))?;
    api.open(vendor_id, product_id)
        .map_err(|e| TransportError::disconnected(e.to_string()))
}

impl HidApiTransport {
    /// Open the first device matching `vendor_id`/`product_id`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Disconnected`] if no such device can be opened.
    pub fn open(vendor_id: u16, product_id: u16) -> TransportResult<Self> {
        let device = open_device(vendor_id, product_id)?;

        let mut info = HidDeviceInfo::new(vendor_id, product_id, String::new());
        if let Ok(Some(manufacturer)) = device.get_manufacturer_string() {
            info = info.with_manufacturer(manufacturer);
        }
        if let Ok(Some(product)) = device.get_product_string() {
            info = info.with_product_name(product);
        }
        debug!(device = %info.display_name(), "opened HID device");

        Ok(Self {
            device: Some(device),
            info,
        })
    }

    fn device(&self) -> TransportResult<&HidDevice> {
        self.device
            .as_ref()
            .ok_or_else(|| TransportError::disconnected(self.info.display_name()))
    }
}

impl Transport for HidApiTransport {
    fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn acquire(&mut self) -> TransportResult {
        if self.device.is_none() {
            return self.reattach();
        }
        Ok(())
    }

    fn reattach(&mut self) -> TransportResult {
        self.device = None;
        self.device = Some(open_device(self.info.vendor_id, self.info.product_id)?);
        Ok(())
    }

    fn read_report(&mut self, buf: &mut [u8], timeout_ms: u32) -> TransportResult<usize> {
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        match self.device()?.read_timeout(buf, timeout) {
            Ok(0) => Err(TransportError::Timeout { timeout_ms }),
            Ok(n) => Ok(n),
            Err(e) => {
                warn!(device = %self.info.display_name(), error = %e, "HID read failed");
                Err(TransportError::InputLost)
            }
        }
    }

    fn write_report(&mut self, data: &[u8]) -> TransportResult<usize> {
        self.device()?.write(data).map_err(|e| other(&e))
    }

    fn close(&mut self) {
        self.device = None;
    }
}
