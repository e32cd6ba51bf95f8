//! Gyrometer and accelerometer readers.
//!
//! A reader pulls the newest raw sample from a [`SensorBackend`], converts
//! it to physical units, remaps platform-frame samples into the canonical
//! device frame and optionally smooths them. Serial and controller IMUs
//! already report in the device frame, so their samples skip the remap.

use core::fmt;

use handpad_input::{SensorSpec, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calibration::SensorCalibration;
use crate::filter::{OneEuroConfig, Vector3Filter};

/// Where samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFamily {
    /// Operating system sensor API, mounted in the platform frame.
    Platform,
    /// External serial IMU, already in the device frame.
    SerialImu,
    /// IMU embedded in the controller report, already in the device frame.
    Controller,
}

impl SensorFamily {
    pub const fn is_device_frame(self) -> bool {
        !matches!(self, SensorFamily::Platform)
    }

    /// Only the platform API is noisy enough to need smoothing.
    pub const fn is_jittery(self) -> bool {
        matches!(self, SensorFamily::Platform)
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorFamily::Platform => "platform",
            SensorFamily::SerialImu => "serial IMU",
            SensorFamily::Controller => "controller",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Angular velocity in deg/s.
    Gyrometer,
    /// Acceleration in g.
    Accelerometer,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Gyrometer => f.write_str("gyrometer"),
            SensorKind::Accelerometer => f.write_str("accelerometer"),
        }
    }
}

/// Source of raw three-axis samples.
pub trait SensorBackend: Send {
    /// Newest sample since the previous call, or `None` if nothing new
    /// arrived.
    fn read(&mut self) -> Option<Vector3>;
}

impl<F> SensorBackend for F
where
    F: FnMut() -> Option<Vector3> + Send,
{
    fn read(&mut self) -> Option<Vector3> {
        self()
    }
}

/// One normalized IMU channel.
pub struct ImuReader {
    kind: SensorKind,
    family: SensorFamily,
    calibration: SensorCalibration,
    spec: Option<SensorSpec>,
    backend: Option<Box<dyn SensorBackend>>,
    filter: Option<Vector3Filter>,
    reading: Vector3,
    warned_missing: bool,
}

impl fmt::Debug for ImuReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImuReader")
            .field("kind", &self.kind)
            .field("family", &self.family)
            .field("calibration", &self.calibration)
            .field("spec", &self.spec)
            .field("has_backend", &self.backend.is_some())
            .field("filtered", &self.filter.is_some())
            .field("reading", &self.reading)
            .finish()
    }
}

impl ImuReader {
    /// Jittery families get a One-Euro filter with default tuning.
    pub fn new(
        kind: SensorKind,
        family: SensorFamily,
        calibration: SensorCalibration,
        backend: Option<Box<dyn SensorBackend>>,
    ) -> Self {
        let filter = family
            .is_jittery()
            .then(|| Vector3Filter::new(OneEuroConfig::default()));

        let missing = backend.is_none();
        if missing {
            warn!(sensor = %kind, family = %family, "IMU reader has no backend");
        } else {
            debug!(sensor = %kind, family = %family, "IMU reader initialised");
        }

        Self {
            kind,
            family,
            calibration,
            spec: None,
            backend,
            filter,
            reading: Vector3::ZERO,
            warned_missing: missing,
        }
    }

    pub fn gyrometer(
        family: SensorFamily,
        calibration: SensorCalibration,
        backend: Option<Box<dyn SensorBackend>>,
    ) -> Self {
        Self::new(SensorKind::Gyrometer, family, calibration, backend)
    }

    pub fn accelerometer(
        family: SensorFamily,
        calibration: SensorCalibration,
        backend: Option<Box<dyn SensorBackend>>,
    ) -> Self {
        Self::new(SensorKind::Accelerometer, family, calibration, backend)
    }

    /// Convert raw counts to physical units before the remap.
    #[must_use]
    pub fn with_spec(mut self, spec: SensorSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Replace the smoothing filter; `None` disables smoothing.
    #[must_use]
    pub fn with_filter(mut self, config: Option<OneEuroConfig>) -> Self {
        self.filter = config.map(Vector3Filter::new);
        self
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn family(&self) -> SensorFamily {
        self.family
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Last normalized reading.
    pub fn reading(&self) -> Vector3 {
        self.reading
    }

    /// Install or replace the backend, dropping filter history.
    pub fn attach(&mut self, backend: Box<dyn SensorBackend>) {
        self.backend = Some(backend);
        self.warned_missing = false;
        self.reset();
    }

    pub fn detach(&mut self) {
        self.backend = None;
    }

    /// Pull the newest sample, if any, and return the current reading.
    ///
    /// Without a backend, or when no new sample arrived, the last reading
    /// is kept.
    pub fn poll(&mut self, rate_hz: f64) -> Vector3 {
        let Some(backend) = self.backend.as_mut() else {
            if !self.warned_missing {
                warn!(sensor = %self.kind, family = %self.family, "no sensor backend, keeping last reading");
                self.warned_missing = true;
            }
            return self.reading;
        };

        if let Some(raw) = backend.read() {
            self.reading = self.normalize(raw, rate_hz);
        }
        self.reading
    }

    /// Feed a sample pushed by a callback-driven source.
    pub fn push(&mut self, raw: Vector3, rate_hz: f64) -> Vector3 {
        self.reading = self.normalize(raw, rate_hz);
        self.reading
    }

    fn normalize(&mut self, raw: Vector3, rate_hz: f64) -> Vector3 {
        let mut value = match self.spec {
            Some(spec) => Vector3::new(spec.apply(raw.x), spec.apply(raw.y), spec.apply(raw.z)),
            None => raw,
        };

        if !self.family.is_device_frame() {
            value = self.calibration.apply(value);
        }

        match self.filter.as_mut() {
            Some(filter) => filter.filter(value, rate_hz),
            None => value,
        }
    }

    /// Zero the reading and forget filter history.
    pub fn reset(&mut self) {
        self.reading = Vector3::ZERO;
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
    }
}

/// Motion in the horizontal plane whatever way the device is held.
///
/// Gravity is normalized so shaking cannot amplify the result. The x
/// component blends yaw and roll by how much gravity lies along each; y is
/// the pitch rate. Zero gravity yields zero.
pub fn auto_roll_yaw_swap(gravity: Vector3, angular_velocity: Vector3) -> Vector2 {
    if gravity.is_zero() {
        return Vector2::ZERO;
    }

    let g = gravity.normalized();
    Vector2::new(
        g.z * angular_velocity.z + g.y * angular_velocity.y,
        angular_velocity.x,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::AxisSwap;
    use handpad_input::Axis3;

    #[test]
    fn test_missing_backend_keeps_last_reading() {
        let mut reader =
            ImuReader::gyrometer(SensorFamily::Platform, SensorCalibration::IDENTITY, None)
                .with_filter(None);
        reader.push(Vector3::new(1.0, 2.0, 3.0), 100.0);
        reader.detach();
        assert_eq!(reader.poll(100.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(reader.poll(100.0), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_no_new_sample_keeps_reading() {
        let mut samples = vec![Vector3::new(4.0, 5.0, 6.0)];
        let backend = move || samples.pop();
        let mut reader = ImuReader::gyrometer(
            SensorFamily::Controller,
            SensorCalibration::IDENTITY,
            Some(Box::new(backend)),
        );
        assert_eq!(reader.poll(100.0), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(reader.poll(100.0), Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_device_frame_sources_skip_remap() -> Result<(), handpad_errors::ValidationError> {
        let cal = SensorCalibration::new(
            "t",
            Vector3::new(-1.0, -1.0, -1.0),
            AxisSwap::new(Axis3::Z, Axis3::Y, Axis3::X),
        )?;
        let raw = Vector3::new(1.0, 2.0, 3.0);

        let mut serial = ImuReader::gyrometer(SensorFamily::SerialImu, cal, None);
        assert_eq!(serial.push(raw, 100.0), raw);

        let mut platform =
            ImuReader::gyrometer(SensorFamily::Platform, cal, None).with_filter(None);
        assert_eq!(platform.push(raw, 100.0), Vector3::new(-3.0, -2.0, -1.0));
        Ok(())
    }

    #[test]
    fn test_platform_family_is_filtered_by_default() {
        let reader =
            ImuReader::accelerometer(SensorFamily::Platform, SensorCalibration::IDENTITY, None);
        assert!(format!("{reader:?}").contains("filtered: true"));
        assert!(!reader.is_available());
    }

    #[test]
    fn test_auto_roll_yaw_swap_zero_gravity() {
        let out = auto_roll_yaw_swap(Vector3::ZERO, Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(out, Vector2::ZERO);
    }

    #[test]
    fn test_auto_roll_yaw_swap_flat_uses_yaw() {
        let out = auto_roll_yaw_swap(Vector3::new(0.0, 0.0, 2.0), Vector3::new(5.0, 7.0, 11.0));
        assert!((out.x - 11.0).abs() < 1e-6);
        assert!((out.y - 5.0).abs() < 1e-6);
    }
}
