//! Property tests for sparse state and range mapping.

use handpad_input::{AxisFlags, ButtonFlags, ButtonState, map_range, normalize_xbox_input};
use proptest::prelude::*;

fn button() -> impl Strategy<Value = ButtonFlags> {
    proptest::sample::select(ButtonFlags::ALL.to_vec())
}

fn button_state() -> impl Strategy<Value = ButtonState> {
    proptest::collection::vec(button(), 0..12).prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_overwrite_contains_both_sides(injected in button_state(), physical in button_state()) {
        let mut merged = physical.clone();
        ButtonState::overwrite(&injected, &mut merged);
        for b in injected.pressed().chain(physical.pressed()) {
            prop_assert!(merged.get(b));
        }
        prop_assert!(merged.len() <= injected.len() + physical.len());
    }

    #[test]
    fn prop_set_false_round_trips_to_empty(buttons in proptest::collection::vec(button(), 0..12)) {
        let mut state = ButtonState::new();
        for &b in &buttons {
            state.set(b, true);
        }
        for &b in &buttons {
            state.set(b, false);
        }
        prop_assert!(state.is_empty());
    }

    #[test]
    fn prop_u16_to_i16_map_is_monotonic(a in any::<u16>(), b in any::<u16>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let map = |v: u16| map_range(f32::from(v), 0.0, 65535.0, -32768.0, 32767.0);
        prop_assert!(map(lo) <= map(hi));
    }

    #[test]
    fn prop_normalize_xbox_input_is_monotonic(a in any::<i16>(), b in any::<i16>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(normalize_xbox_input(f32::from(lo)) <= normalize_xbox_input(f32::from(hi)));
    }

    #[test]
    fn prop_axis_flags_decode_or_reject(value in any::<u8>()) {
        match AxisFlags::try_from(value) {
            Ok(axis) => prop_assert_eq!(axis.as_u8(), value),
            Err(_) => prop_assert!(!AxisFlags::ALL.iter().any(|a| a.as_u8() == value)),
        }
    }
}

#[test]
fn test_mid_scale_maps_within_one_lsb_of_zero() {
    let mid = f32::from(u16::MAX / 2);
    let mapped = map_range(mid, 0.0, f32::from(u16::MAX), f32::from(i16::MIN), f32::from(i16::MAX));
    assert!(mapped.abs() <= 1.0, "mid-scale mapped to {mapped}");
}

#[test]
fn test_button_state_serializes_as_pressed_list() -> Result<(), serde_json::Error> {
    let state = ButtonState::new().with(ButtonFlags::B1).with(ButtonFlags::DPadUp);
    let json = serde_json::to_string(&state)?;
    assert_eq!(json, r#"{"pressed":["DPadUp","B1"]}"#);
    let back: ButtonState = serde_json::from_str(&json)?;
    assert_eq!(back, state);
    Ok(())
}
