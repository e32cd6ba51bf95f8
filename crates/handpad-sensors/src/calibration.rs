//! Per-device axis swap and sign tables.
//!
//! A handheld's IMU is rarely mounted in the canonical frame. Each device
//! supplies, for the gyroscope and the accelerometer separately, a
//! permutation telling which raw axis feeds each canonical axis and a sign
//! vector of ±1 components applied after the permutation.

use handpad_errors::ValidationError;
use handpad_input::{Axis3, Vector3};
use serde::{Deserialize, Serialize};

/// Which raw axis feeds each canonical axis.
///
/// Must be a bijection over {X, Y, Z}; [`AxisSwap::validate`] rejects
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSwap {
    pub x: Axis3,
    pub y: Axis3,
    pub z: Axis3,
}

impl AxisSwap {
    pub const IDENTITY: AxisSwap = AxisSwap::new(Axis3::X, Axis3::Y, Axis3::Z);

    /// Canonical Y reads raw Z and canonical Z reads raw Y.
    pub const SWAP_YZ: AxisSwap = AxisSwap::new(Axis3::X, Axis3::Z, Axis3::Y);

    pub const fn new(x: Axis3, y: Axis3, z: Axis3) -> Self {
        Self { x, y, z }
    }

    /// Raw axis that feeds canonical `axis`.
    pub const fn source(&self, axis: Axis3) -> Axis3 {
        match axis {
            Axis3::X => self.x,
            Axis3::Y => self.y,
            Axis3::Z => self.z,
        }
    }

    pub fn is_bijection(&self) -> bool {
        Axis3::ALL
            .iter()
            .all(|axis| [self.x, self.y, self.z].contains(axis))
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAxisSwap`] when some raw axis is
    /// used twice (and therefore another is never used).
    pub fn validate(&self, table: &str) -> Result<(), ValidationError> {
        if self.is_bijection() {
            Ok(())
        } else {
            Err(ValidationError::invalid_axis_swap(table, self.to_string()))
        }
    }

    /// Permute a raw reading into the canonical frame.
    pub fn apply(&self, raw: Vector3) -> Vector3 {
        Vector3::new(
            raw.get(self.source(Axis3::X)),
            raw.get(self.source(Axis3::Y)),
            raw.get(self.source(Axis3::Z)),
        )
    }
}

impl Default for AxisSwap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl core::fmt::Display for AxisSwap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "X<-{} Y<-{} Z<-{}",
            self.x.as_char(),
            self.y.as_char(),
            self.z.as_char()
        )
    }
}

/// Swap plus sign for one sensor of one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorCalibration {
    sign: Vector3,
    swap: AxisSwap,
}

impl SensorCalibration {
    pub const IDENTITY: SensorCalibration = SensorCalibration {
        sign: Vector3::ONE,
        swap: AxisSwap::IDENTITY,
    };

    /// Build a calibration, rejecting non-bijective swaps and sign
    /// components other than +1 and -1.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAxisSwap`] or
    /// [`ValidationError::InvalidSign`] naming `table`.
    pub fn new(table: &str, sign: Vector3, swap: AxisSwap) -> Result<Self, ValidationError> {
        let calibration = Self { sign, swap };
        calibration.validate(table)?;
        Ok(calibration)
    }

    pub fn sign(&self) -> Vector3 {
        self.sign
    }

    pub fn swap(&self) -> AxisSwap {
        self.swap
    }

    /// # Errors
    ///
    /// See [`SensorCalibration::new`].
    pub fn validate(&self, table: &str) -> Result<(), ValidationError> {
        self.swap.validate(table)?;
        for axis in Axis3::ALL {
            let component = self.sign.get(axis);
            if (component.abs() - 1.0).abs() > f32::EPSILON {
                return Err(ValidationError::invalid_sign(
                    table,
                    axis.as_char(),
                    component,
                ));
            }
        }
        Ok(())
    }

    /// `canonical[a] = raw[swap[a]] * sign[a]`
    pub fn apply(&self, raw: Vector3) -> Vector3 {
        self.swap.apply(raw).scale(self.sign)
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}
