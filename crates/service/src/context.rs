//! Process-wide state, built once at startup and passed to whoever needs it.

use std::sync::Arc;

use handpad_controller::{ControllerKind, MotionSensors};
use handpad_devices::{DeviceDescriptor, DeviceRegistry, UsbId};
use handpad_errors::ValidationError;
use handpad_hid_common::HidDeviceInfo;
use handpad_scheduler::TickBus;
use handpad_sensors::{ImuReader, SensorFamily};
use handpad_targets::SharedBus;
use tokio::runtime::Handle;

use crate::config::ServiceConfig;

pub struct ServiceContext {
    config: ServiceConfig,
    registry: DeviceRegistry,
    ticks: Arc<TickBus>,
    bus: SharedBus,
    runtime: Handle,
}

impl core::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("devices", &self.registry.len())
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl ServiceContext {
    /// Validate `config` and load the built-in device table.
    ///
    /// # Errors
    ///
    /// The first validation failure in the config or the device table.
    pub fn new(
        config: ServiceConfig,
        bus: SharedBus,
        runtime: Handle,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: DeviceRegistry::builtin()?,
            ticks: Arc::new(TickBus::new()),
            bus,
            runtime,
        })
    }

    #[must_use]
    pub fn with_registry(mut self, registry: DeviceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn tick_bus(&self) -> &Arc<TickBus> {
        &self.ticks
    }

    pub fn virtual_bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Descriptor for the device behind `info`.
    ///
    /// A configured override replaces the firmware strings and skips the
    /// USB id match.
    pub fn resolve_device(&self, info: &HidDeviceInfo) -> &DeviceDescriptor {
        match &self.config.device {
            Some(device) => self
                .registry
                .resolve(None, &device.manufacturer, &device.product),
            None => self.registry.resolve(
                Some(UsbId::new(info.vendor_id, info.product_id)),
                info.manufacturer.as_deref().unwrap_or_default(),
                info.product_name.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Platform motion for controllers whose reports carry no IMU.
    ///
    /// No platform sensor backend is wired here; the readers log once and
    /// hold their last value.
    pub fn motion_for(
        &self,
        kind: ControllerKind,
        device: &DeviceDescriptor,
    ) -> Option<MotionSensors> {
        if kind.reports_motion() {
            return None;
        }
        Some(MotionSensors::new(
            ImuReader::gyrometer(SensorFamily::Platform, device.gyro, None),
            ImuReader::accelerometer(SensorFamily::Platform, device.accel, None),
        ))
    }
}
