//! Built-in table invariants and descriptor file format.

use handpad_devices::{DeviceDescriptor, DeviceRegistry, UsbId, builtin_descriptors};
use handpad_input::Axis3;
use handpad_test_helpers::{must, must_err, must_some};
use proptest::prelude::*;

#[test]
fn test_every_builtin_swap_is_a_bijection() {
    for device in must(builtin_descriptors()) {
        for swap in [device.gyro.swap(), device.accel.swap()] {
            for axis in Axis3::ALL {
                let uses = [swap.x, swap.y, swap.z]
                    .iter()
                    .filter(|&&a| a == axis)
                    .count();
                assert_eq!(uses, 1, "{}: axis {:?} used {uses} times", device.name, axis);
            }
        }
    }
}

#[test]
fn test_every_builtin_sign_is_unit() {
    for device in must(builtin_descriptors()) {
        for sign in [device.gyro.sign(), device.accel.sign()] {
            for axis in Axis3::ALL {
                assert!(
                    (sign.get(axis).abs() - 1.0).abs() < f32::EPSILON,
                    "{}: sign {:?}",
                    device.name,
                    sign
                );
            }
        }
    }
}

#[test]
fn test_no_usb_id_is_claimed_twice() {
    let devices = must(builtin_descriptors());
    let mut ids: Vec<_> = devices.iter().flat_map(|d| d.usb_ids.iter().copied()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_descriptor_yaml_snapshot() {
    let registry = must(DeviceRegistry::builtin());
    let deck = registry.by_name("Steam Deck");
    insta::assert_yaml_snapshot!(deck, @r#"
    name: Steam Deck
    manufacturer: Valve
    product_names:
    - Jupiter
    - Galileo
    usb_ids:
    - vendor_id: 10462
      product_id: 4613
    gyro:
      sign:
        x: 1.0
        y: 1.0
        z: 1.0
      swap:
        x: X
        y: Y
        z: Z
    accel:
      sign:
        x: 1.0
        y: 1.0
        z: 1.0
      swap:
        x: X
        y: Y
        z: Z
    oem_chords:
    - name: Quick Access
      button: OEM1
      keys: []
    key_press_delay_ms: 20
    "#);
}

#[test]
fn test_user_descriptor_from_yaml_registers() {
    let yaml = r"
name: Custom Handheld
manufacturer: Acme
product_names: [HX-1]
usb_ids:
  - {vendor_id: 4660, product_id: 1}
gyro:
  sign: {x: -1.0, y: 1.0, z: 1.0}
  swap: {x: X, y: Z, z: Y}
";
    let descriptor: DeviceDescriptor = must(serde_yaml::from_str(yaml));
    assert_eq!(descriptor.key_press_delay_ms, 20);

    let mut registry = must(DeviceRegistry::builtin());
    must(registry.register(descriptor));
    let found = registry.resolve(None, "ACME", "hx-1");
    assert_eq!(found.name, "Custom Handheld");
}

#[test]
fn test_unknown_descriptor_field_is_rejected() {
    let yaml = "name: X\nmanufacturer: Y\ntdp: 15\n";
    let err = must_err(serde_yaml::from_str::<DeviceDescriptor>(yaml));
    assert!(err.to_string().contains("tdp"), "{err}");
}

fn flip_case(text: &str, mask: u64) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if (mask >> (i % 64)) & 1 == 1 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_model_lookup_ignores_case(index in 0usize..64, mask in any::<u64>()) {
        let registry = must(DeviceRegistry::builtin());
        let named: Vec<_> = registry
            .iter()
            .filter(|d| !d.manufacturer.is_empty() && !d.product_names.is_empty())
            .collect();
        prop_assume!(!named.is_empty());
        let device = must_some(named.get(index % named.len()).copied(), "named builtin device");
        let product = device.product_names.first().map(String::as_str).unwrap_or_default();

        let resolved = registry.resolve(
            None,
            &flip_case(&device.manufacturer, mask),
            &format!("  {}  ", flip_case(product, !mask)),
        );
        prop_assert_eq!(&resolved.name, &device.name);
    }

    #[test]
    fn prop_unknown_identity_falls_back_to_generic(
        vendor_id in 0xF000u16..,
        product_id in any::<u16>(),
        product in "[a-z]{1,12}",
    ) {
        let registry = must(DeviceRegistry::builtin());
        let resolved = registry.resolve(
            Some(UsbId::new(vendor_id, product_id)),
            "Nobody Makes This",
            &product,
        );
        prop_assert_eq!(&resolved.name, &registry.generic().name);
    }
}
