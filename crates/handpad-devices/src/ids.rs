//! USB identifiers of the handheld controllers in the built-in table.
//!
//! Sources: vendor HID descriptors as enumerated on retail units.

/// ASUSTeK.
pub const ASUS_VENDOR_ID: u16 = 0x0B05;
/// ROG Ally (RC71L) keyboard/OEM HID interface.
pub const ROG_ALLY_PID: u16 = 0x1ABE;

/// One-Netbook, shared by AOKZOE and OneXPlayer LED/OEM interfaces.
pub const ONE_NETBOOK_VENDOR_ID: u16 = 0x1A2C;
/// AOKZOE A1 LED/OEM interface.
pub const AOKZOE_A1_PID: u16 = 0xB001;

/// Micro-Star International.
pub const MSI_VENDOR_ID: u16 = 0x0DB0;
pub const CLAW_XINPUT_PID: u16 = 0x1901;
pub const CLAW_DINPUT_PID: u16 = 0x1902;
pub const CLAW_TESTING_PID: u16 = 0x1903;

/// Lenovo.
pub const LENOVO_VENDOR_ID: u16 = 0x17EF;
/// Legion Go controller modes, original and 2025 firmware.
pub const LEGION_GO_PIDS: [u16; 8] = [
    0x6182, // xinput
    0x6183, // dinput
    0x6184, // dual dinput
    0x6185, // fps
    0x61EB, // xinput, 2025 firmware
    0x61EC, // dinput, 2025 firmware
    0x61ED, // dual dinput, 2025 firmware
    0x61EE, // fps, 2025 firmware
];

/// Valve.
pub const VALVE_VENDOR_ID: u16 = 0x28DE;
/// Steam Deck built-in controller.
pub const STEAM_DECK_PID: u16 = 0x1205;
