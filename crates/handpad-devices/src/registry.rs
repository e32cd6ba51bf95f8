//! Descriptor lookup by USB id or firmware model strings.

use std::collections::HashMap;

use handpad_errors::ValidationError;
use handpad_input::{Axis3, ButtonFlags, Vector3};
use handpad_sensors::{AxisSwap, SensorCalibration};
use tracing::{debug, info};

use crate::descriptor::{DeviceDescriptor, OemChord, UsbId};
use crate::ids::*;

/// Validated set of device descriptors plus a generic fallback.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
    by_usb: HashMap<UsbId, usize>,
    fallback: DeviceDescriptor,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl DeviceRegistry {
    /// No devices; every lookup resolves to the generic descriptor.
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
            by_usb: HashMap::new(),
            fallback: DeviceDescriptor::generic(),
        }
    }

    /// Registry preloaded with every built-in handheld.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in table is malformed.
    pub fn builtin() -> Result<Self, ValidationError> {
        let mut registry = Self::empty();
        for descriptor in builtin_descriptors()? {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Validate and add a descriptor.
    ///
    /// # Errors
    ///
    /// Rejects descriptors that fail [`DeviceDescriptor::validate`], reuse
    /// an already registered name, or claim a USB id owned by another
    /// descriptor. A rejected descriptor leaves the registry unchanged.
    pub fn register(&mut self, descriptor: DeviceDescriptor) -> Result<(), ValidationError> {
        descriptor.validate()?;

        if self
            .devices
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(&descriptor.name))
        {
            return Err(ValidationError::not_unique("name", descriptor.name));
        }
        if let Some(id) = descriptor
            .usb_ids
            .iter()
            .find(|id| self.by_usb.contains_key(id))
        {
            return Err(ValidationError::not_unique("usb_ids", id.to_string()));
        }

        let index = self.devices.len();
        for id in &descriptor.usb_ids {
            self.by_usb.insert(*id, index);
        }
        debug!(device = %descriptor.name, usb_ids = descriptor.usb_ids.len(), "registered device descriptor");
        self.devices.push(descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter()
    }

    pub fn generic(&self) -> &DeviceDescriptor {
        &self.fallback
    }

    pub fn by_name(&self, name: &str) -> Option<&DeviceDescriptor> {
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn by_usb_id(&self, vendor_id: u16, product_id: u16) -> Option<&DeviceDescriptor> {
        self.by_usb
            .get(&UsbId::new(vendor_id, product_id))
            .and_then(|&index| self.devices.get(index))
    }

    pub fn by_model(&self, manufacturer: &str, product: &str) -> Option<&DeviceDescriptor> {
        self.devices
            .iter()
            .find(|d| d.matches_model(manufacturer, product))
    }

    /// USB id first, then manufacturer and product, else the generic
    /// descriptor.
    pub fn resolve(
        &self,
        usb_id: Option<UsbId>,
        manufacturer: &str,
        product: &str,
    ) -> &DeviceDescriptor {
        let found = usb_id
            .and_then(|id| self.by_usb_id(id.vendor_id, id.product_id))
            .or_else(|| self.by_model(manufacturer, product));

        match found {
            Some(descriptor) => {
                info!(device = %descriptor.name, "device identified");
                descriptor
            }
            None => {
                info!(manufacturer, product, "unknown device, using generic tables");
                &self.fallback
            }
        }
    }
}

fn calibration(
    table: &str,
    sign: (f32, f32, f32),
    swap: AxisSwap,
) -> Result<SensorCalibration, ValidationError> {
    SensorCalibration::new(table, Vector3::new(sign.0, sign.1, sign.2), swap)
}

/// The built-in handheld table.
///
/// # Errors
///
/// Fails only if a table entry is malformed.
pub fn builtin_descriptors() -> Result<Vec<DeviceDescriptor>, ValidationError> {
    let swap_yz = AxisSwap::SWAP_YZ;

    Ok(vec![
        DeviceDescriptor::new("ROG Ally", "ASUSTeK COMPUTER INC.")
            .with_products(["RC71L"])
            .with_usb_ids(ASUS_VENDOR_ID, &[ROG_ALLY_PID])
            .with_gyro(calibration(
                "ROG Ally gyroscope",
                (-1.0, -1.0, 1.0),
                AxisSwap::new(Axis3::X, Axis3::Z, Axis3::Y),
            )?)
            .with_accel(calibration(
                "ROG Ally accelerometer",
                (-1.0, -1.0, 1.0),
                AxisSwap::new(Axis3::X, Axis3::Z, Axis3::Y),
            )?)
            .with_chord(OemChord::new("Command Center", ButtonFlags::OEM1))
            .with_chord(OemChord::new("Armoury Crate", ButtonFlags::OEM2))
            .with_chord(OemChord::new("M1", ButtonFlags::OEM3).with_keys(["F18"]))
            .with_chord(OemChord::new("M2", ButtonFlags::OEM4).with_keys(["F17"])),
        DeviceDescriptor::new("AOKZOE A1", "AOKZOE")
            .with_products(["AOKZOE A1 AR07", "AOKZOE A1 Pro"])
            .with_usb_ids(ONE_NETBOOK_VENDOR_ID, &[AOKZOE_A1_PID])
            .with_gyro(calibration("AOKZOE A1 gyroscope", (1.0, -1.0, 1.0), swap_yz)?)
            .with_accel(calibration(
                "AOKZOE A1 accelerometer",
                (1.0, -1.0, -1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("GPD Win 4", "GPD")
            .with_products(["G1618-04"])
            .with_gyro(calibration("GPD Win 4 gyroscope", (-1.0, -1.0, 1.0), swap_yz)?)
            .with_accel(calibration(
                "GPD Win 4 accelerometer",
                (1.0, 1.0, 1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("MSI Claw A1M", "Micro-Star International Co., Ltd.")
            .with_products(["MS-1T41", "Claw A1M"])
            .with_usb_ids(
                MSI_VENDOR_ID,
                &[CLAW_XINPUT_PID, CLAW_DINPUT_PID, CLAW_TESTING_PID],
            )
            .with_gyro(calibration("MSI Claw gyroscope", (1.0, 1.0, -1.0), swap_yz)?)
            .with_accel(calibration(
                "MSI Claw accelerometer",
                (-1.0, -1.0, 1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("Legion Go", "LENOVO")
            .with_products(["LNVNB161216", "83E1"])
            .with_usb_ids(LENOVO_VENDOR_ID, &LEGION_GO_PIDS)
            .with_gyro(calibration("Legion Go gyroscope", (-1.0, 1.0, 1.0), swap_yz)?)
            .with_accel(calibration(
                "Legion Go accelerometer",
                (1.0, -1.0, -1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("OneXPlayer Mini", "ONE-NETBOOK TECHNOLOGY CO., LTD.")
            .with_products(["ONE XPLAYER", "ONEXPLAYER Mini Pro"])
            .with_gyro(calibration(
                "OneXPlayer Mini gyroscope",
                (1.0, -1.0, 1.0),
                swap_yz,
            )?)
            .with_accel(calibration(
                "OneXPlayer Mini accelerometer",
                (-1.0, -1.0, 1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("AYANEO AIR Plus", "AYANEO")
            .with_products(["AB05-AMD", "AB05-Mendocino", "AB05-Intel"])
            .with_gyro(calibration(
                "AYANEO AIR Plus gyroscope",
                (1.0, -1.0, -1.0),
                swap_yz,
            )?)
            .with_accel(calibration(
                "AYANEO AIR Plus accelerometer",
                (-1.0, -1.0, -1.0),
                swap_yz,
            )?),
        DeviceDescriptor::new("Steam Deck", "Valve")
            .with_products(["Jupiter", "Galileo"])
            .with_usb_ids(VALVE_VENDOR_ID, &[STEAM_DECK_PID])
            .with_chord(OemChord::new("Quick Access", ButtonFlags::OEM1)),
    ])
}
