//! Invariant checks for sensor calibration and smoothing.

use handpad_errors::ValidationError;
use handpad_input::{Axis3, SensorSpec, Vector3};
use handpad_sensors::{AxisSwap, ImuReader, SensorCalibration, SensorFamily};
use proptest::prelude::*;

fn axis() -> impl Strategy<Value = Axis3> {
    prop_oneof![Just(Axis3::X), Just(Axis3::Y), Just(Axis3::Z)]
}

fn sign() -> impl Strategy<Value = f32> {
    prop_oneof![Just(1.0_f32), Just(-1.0_f32)]
}

proptest! {
    #[test]
    fn prop_swap_valid_iff_each_axis_used_once(x in axis(), y in axis(), z in axis()) {
        let swap = AxisSwap::new(x, y, z);
        let distinct = x != y && y != z && x != z;
        prop_assert_eq!(swap.validate("prop").is_ok(), distinct);
    }

    #[test]
    fn prop_calibration_preserves_magnitude(
        sx in sign(), sy in sign(), sz in sign(),
        rx in -2000.0_f32..2000.0, ry in -2000.0_f32..2000.0, rz in -2000.0_f32..2000.0,
    ) {
        for swap in [AxisSwap::IDENTITY, AxisSwap::SWAP_YZ, AxisSwap::new(Axis3::Z, Axis3::X, Axis3::Y)] {
            let cal = SensorCalibration::new("prop", Vector3::new(sx, sy, sz), swap);
            prop_assert!(cal.is_ok());
            if let Ok(cal) = cal {
                let raw = Vector3::new(rx, ry, rz);
                let out = cal.apply(raw);
                prop_assert!((out.length() - raw.length()).abs() <= raw.length() * 1e-5 + 1e-3);
            }
        }
    }

    #[test]
    fn prop_sign_must_be_unit(value in -3.0_f32..3.0) {
        prop_assume!((value.abs() - 1.0).abs() > 1e-3);
        let result = SensorCalibration::new("prop", Vector3::new(1.0, 1.0, value), AxisSwap::IDENTITY);
        prop_assert_eq!(result, Err(ValidationError::invalid_sign("prop", 'Z', value)));
    }
}

#[test]
fn test_half_g_with_negated_x_is_exact() -> Result<(), ValidationError> {
    let cal = SensorCalibration::new("accel", Vector3::new(-1.0, 1.0, 1.0), AxisSwap::IDENTITY)?;
    let mut reader = ImuReader::accelerometer(SensorFamily::Platform, cal, None)
        .with_spec(SensorSpec::RAW_ACCEL_1G)
        .with_filter(None);

    let out = reader.push(Vector3::new(16384.0, 0.0, 0.0), 100.0);
    assert!((out.x + 0.5).abs() < f32::EPSILON, "x = {}", out.x);
    assert!(out.y.abs() < f32::EPSILON);
    Ok(())
}
