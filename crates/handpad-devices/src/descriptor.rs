//! One record per supported handheld.

use core::fmt;
use std::time::Duration;

use handpad_errors::ValidationError;
use handpad_input::ButtonFlags;
use handpad_sensors::SensorCalibration;
use serde::{Deserialize, Serialize};

/// USB vendor/product pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsbId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

/// A vendor button bound to a key chord.
///
/// An empty key list means the button only feeds the injected button
/// state and sends nothing to the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OemChord {
    pub name: String,
    pub button: ButtonFlags,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl OemChord {
    pub fn new(name: impl Into<String>, button: ButtonFlags) -> Self {
        Self {
            name: name.into(),
            button,
            keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

/// Default delay between the press and the release of a simulated key.
pub const DEFAULT_KEY_PRESS_DELAY_MS: u64 = 20;

fn default_key_press_delay_ms() -> u64 {
    DEFAULT_KEY_PRESS_DELAY_MS
}

/// Everything the pipeline needs to know about one handheld model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceDescriptor {
    pub name: String,
    /// Firmware manufacturer string, matched case-insensitively.
    #[serde(default)]
    pub manufacturer: String,
    /// Firmware product strings, matched case-insensitively.
    #[serde(default)]
    pub product_names: Vec<String>,
    #[serde(default)]
    pub usb_ids: Vec<UsbId>,
    #[serde(default)]
    pub gyro: SensorCalibration,
    #[serde(default)]
    pub accel: SensorCalibration,
    #[serde(default)]
    pub oem_chords: Vec<OemChord>,
    #[serde(default = "default_key_press_delay_ms")]
    pub key_press_delay_ms: u64,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            product_names: Vec::new(),
            usb_ids: Vec::new(),
            gyro: SensorCalibration::IDENTITY,
            accel: SensorCalibration::IDENTITY,
            oem_chords: Vec::new(),
            key_press_delay_ms: DEFAULT_KEY_PRESS_DELAY_MS,
        }
    }

    /// Identity tables, no chords, matched by nothing.
    pub fn generic() -> Self {
        Self::new("Generic", "")
    }

    #[must_use]
    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.product_names = products.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_usb_ids(mut self, vendor_id: u16, product_ids: &[u16]) -> Self {
        self.usb_ids
            .extend(product_ids.iter().map(|&pid| UsbId::new(vendor_id, pid)));
        self
    }

    #[must_use]
    pub fn with_gyro(mut self, gyro: SensorCalibration) -> Self {
        self.gyro = gyro;
        self
    }

    #[must_use]
    pub fn with_accel(mut self, accel: SensorCalibration) -> Self {
        self.accel = accel;
        self
    }

    #[must_use]
    pub fn with_chord(mut self, chord: OemChord) -> Self {
        self.oem_chords.push(chord);
        self
    }

    pub fn key_press_delay(&self) -> Duration {
        Duration::from_millis(self.key_press_delay_ms)
    }

    pub fn chord_for(&self, button: ButtonFlags) -> Option<&OemChord> {
        self.oem_chords.iter().find(|chord| chord.button == button)
    }

    pub fn matches_usb(&self, id: UsbId) -> bool {
        self.usb_ids.contains(&id)
    }

    pub fn matches_model(&self, manufacturer: &str, product: &str) -> bool {
        !self.manufacturer.is_empty()
            && self.manufacturer.eq_ignore_ascii_case(manufacturer.trim())
            && self
                .product_names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(product.trim()))
    }

    /// Check both calibration tables, the chord list and the delay.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        self.gyro.validate(&format!("{} gyroscope", self.name))?;
        self.accel.validate(&format!("{} accelerometer", self.name))?;

        if self.key_press_delay_ms == 0 || self.key_press_delay_ms > 1000 {
            return Err(ValidationError::out_of_range(
                "key_press_delay_ms",
                self.key_press_delay_ms,
                1,
                1000,
            ));
        }

        for (i, chord) in self.oem_chords.iter().enumerate() {
            let clash = self
                .oem_chords
                .iter()
                .skip(i.saturating_add(1))
                .any(|other| other.button == chord.button);
            if clash {
                return Err(ValidationError::not_unique(
                    "oem_chords.button",
                    chord.button.to_string(),
                ));
            }
        }

        for (i, id) in self.usb_ids.iter().enumerate() {
            if self.usb_ids.iter().skip(i.saturating_add(1)).any(|other| other == id) {
                return Err(ValidationError::not_unique("usb_ids", id.to_string()));
            }
        }
        Ok(())
    }
}
