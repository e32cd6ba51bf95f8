//! Property tests for press timing and stick shaping.

use handpad_actions::prelude::*;
use handpad_input::Vector2;
use proptest::prelude::*;

fn orientation() -> impl Strategy<Value = ScreenOrientation> {
    prop_oneof![
        Just(ScreenOrientation::Angle0),
        Just(ScreenOrientation::Angle90),
        Just(ScreenOrientation::Angle180),
        Just(ScreenOrientation::Angle270),
    ]
}

fn axis_config() -> impl Strategy<Value = AxisActionConfig> {
    (
        0u8..50,
        50u8..=100,
        0u8..=100,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(inner, outer, anti, circ, rotated, inverted, auto)| {
            AxisActionConfig::new(handpad_input::AxisLayoutFlags::LeftStick)
                .with_deadzone(inner, outer)
                .with_anti_deadzone(anti)
                .with_circularity(circ)
                .with_rotation(rotated, inverted)
                .with_auto_rotate(auto)
        })
}

proptest! {
    #[test]
    fn prop_center_stays_center(config in axis_config(), orientation in orientation()) {
        let mut action = AxisActions::new(config);
        let ctx = ActionContext::new(10).with_orientation(orientation);
        let out = action.execute(Vector2::ZERO, &ctx);
        prop_assert!(out.is_zero());
        prop_assert_eq!(action.value(), ActionValue::Axis(0, 0));
    }

    #[test]
    fn prop_radial_deadzone_monotonic_in_magnitude(
        inner in 1u8..50,
        outer in 50u8..=100,
        angle in 0.0f32..std::f32::consts::TAU,
        a in 0.0f32..1.2,
        b in 0.0f32..1.2,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let dir = Vector2::new(angle.cos(), angle.sin()) * f32::from(i16::MAX);
        let out_lo = radial_inner_outer_deadzone(dir * lo, inner, outer).length();
        let out_hi = radial_inner_outer_deadzone(dir * hi, inner, outer).length();
        prop_assert!(out_lo <= out_hi + 1.0e-2);
        prop_assert!(out_hi <= f32::from(i16::MAX) + 1.0);
    }

    #[test]
    fn prop_trigger_deadzone_bounded(value in 0i16..=255, inner in 0u8..50, outer in 50u8..=100) {
        let out = inner_outer_deadzone(f32::from(value), inner, outer, 255.0);
        prop_assert!((0.0..=255.0).contains(&out));
    }

    #[test]
    fn prop_turbo_flip_count_tracks_held_time(period in 1u32..=10, held_ms in 60u32..2000) {
        let config = PressConfig { turbo: true, turbo_delay_ms: 30, ..PressConfig::default() };
        let mut state = PressState::new();
        let ticks = held_ms / period;
        let mut flips = 0u32;
        let mut prev = false;
        for _ in 0..ticks {
            state.step(&config, true, period);
            if state.is_turboed() != prev {
                flips += 1;
                prev = state.is_turboed();
            }
        }
        let held = ticks * period;
        let expected = held.div_ceil(30);
        prop_assert!(flips.abs_diff(expected) <= 1, "flips {} expected {}", flips, expected);
    }

    #[test]
    fn prop_toggle_flips_once_per_cycle(cycles in 1usize..20, idle_ticks in 0usize..5) {
        let config = PressConfig { toggle: true, ..PressConfig::default() };
        let mut state = PressState::new();
        for cycle in 0..cycles {
            state.step(&config, true, 10);
            state.step(&config, false, 10);
            for _ in 0..idle_ticks {
                state.step(&config, false, 10);
            }
            prop_assert_eq!(state.value(), cycle % 2 == 0);
        }
    }
}

#[test]
fn test_deadzone_scenario_ten_ninety() {
    let full = f32::from(i16::MAX);
    let dir = Vector2::new(0.6, 0.8);
    assert!(radial_inner_outer_deadzone(dir * (0.05 * full), 10, 90).is_zero());
    let mid = radial_inner_outer_deadzone(dir * (0.5 * full), 10, 90).length();
    assert!(mid > 0.0 && mid < full);
    let sat = radial_inner_outer_deadzone(dir * (0.95 * full), 10, 90).length();
    assert!((sat - full).abs() < 1.0);
}
