//! Stable identifiers for buttons, analog channels and 2D axis groups.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{InputError, InputResult};

macro_rules! stable_flags {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $err:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Every flag, in discriminant order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub const fn as_u8(self) -> u8 {
                self as u8
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = InputError;

            fn try_from(value: u8) -> InputResult<Self> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(InputError::$err(other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

stable_flags! {
    /// Digital inputs. B1-B4 are the face buttons in south, east, west,
    /// north order; OEM buttons are vendor keys (Armoury Crate, QAM, ...).
    pub enum ButtonFlags: UnknownButton {
        DPadUp = 1,
        DPadDown = 2,
        DPadLeft = 3,
        DPadRight = 4,
        Start = 5,
        Back = 6,
        LeftStickClick = 7,
        RightStickClick = 8,
        L1 = 9,
        R1 = 10,
        B1 = 11,
        B2 = 12,
        B3 = 13,
        B4 = 14,
        B5 = 15,
        B6 = 16,
        B7 = 17,
        B8 = 18,
        B9 = 19,
        B10 = 20,
        B11 = 21,
        /// Guide / PS button
        Special = 22,
        Special2 = 23,
        L2Soft = 24,
        L2Full = 25,
        R2Soft = 26,
        R2Full = 27,
        L4 = 28,
        L5 = 29,
        R4 = 30,
        R5 = 31,
        LeftStickTouch = 32,
        RightStickTouch = 33,
        LeftStickUp = 34,
        LeftStickDown = 35,
        LeftStickLeft = 36,
        LeftStickRight = 37,
        RightStickUp = 38,
        RightStickDown = 39,
        RightStickLeft = 40,
        RightStickRight = 41,
        LeftPadTouch = 42,
        LeftPadClick = 43,
        LeftPadClickUp = 44,
        LeftPadClickDown = 45,
        LeftPadClickLeft = 46,
        LeftPadClickRight = 47,
        RightPadTouch = 48,
        RightPadClick = 49,
        RightPadClickUp = 50,
        RightPadClickDown = 51,
        RightPadClickLeft = 52,
        RightPadClickRight = 53,
        OEM1 = 54,
        OEM2 = 55,
        OEM3 = 56,
        OEM4 = 57,
        OEM5 = 58,
        OEM6 = 59,
        OEM7 = 60,
        OEM8 = 61,
        OEM9 = 62,
        OEM10 = 63,
        VolumeUp = 64,
        VolumeDown = 65,
    }
}

stable_flags! {
    /// Analog channels. Sticks and pads are signed 16-bit, triggers 0-255.
    pub enum AxisFlags: UnknownAxis {
        LeftStickX = 1,
        LeftStickY = 2,
        RightStickX = 3,
        RightStickY = 4,
        L2 = 5,
        R2 = 6,
        LeftPadX = 7,
        LeftPadY = 8,
        RightPadX = 9,
        RightPadY = 10,
    }
}

stable_flags! {
    /// Logical axis groups: a stick or pad pairs two channels, a trigger
    /// wraps one, the gyroscope has none in [`AxisState`](crate::AxisState).
    pub enum AxisLayoutFlags: UnknownAxisLayout {
        LeftStick = 1,
        RightStick = 2,
        L2 = 3,
        R2 = 4,
        LeftPad = 5,
        RightPad = 6,
        Gyroscope = 7,
    }
}

/// The [`AxisFlags`] a layout group reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisChannels {
    /// A 2D vector stored as an x/y pair
    Dual { x: AxisFlags, y: AxisFlags },
    /// A single trigger channel
    Single(AxisFlags),
    /// Not stored in axis state
    None,
}

impl AxisLayoutFlags {
    pub const fn channels(self) -> AxisChannels {
        match self {
            AxisLayoutFlags::LeftStick => AxisChannels::Dual {
                x: AxisFlags::LeftStickX,
                y: AxisFlags::LeftStickY,
            },
            AxisLayoutFlags::RightStick => AxisChannels::Dual {
                x: AxisFlags::RightStickX,
                y: AxisFlags::RightStickY,
            },
            AxisLayoutFlags::LeftPad => AxisChannels::Dual {
                x: AxisFlags::LeftPadX,
                y: AxisFlags::LeftPadY,
            },
            AxisLayoutFlags::RightPad => AxisChannels::Dual {
                x: AxisFlags::RightPadX,
                y: AxisFlags::RightPadY,
            },
            AxisLayoutFlags::L2 => AxisChannels::Single(AxisFlags::L2),
            AxisLayoutFlags::R2 => AxisChannels::Single(AxisFlags::R2),
            AxisLayoutFlags::Gyroscope => AxisChannels::None,
        }
    }

    pub const fn is_trigger(self) -> bool {
        matches!(self, AxisLayoutFlags::L2 | AxisLayoutFlags::R2)
    }
}

impl AxisFlags {
    /// Full-scale magnitude of the channel.
    pub const fn max_value(self) -> i16 {
        match self {
            AxisFlags::L2 | AxisFlags::R2 => u8::MAX as i16,
            _ => i16::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_button_discriminants_are_unique() {
        let values: HashSet<u8> = ButtonFlags::ALL.iter().map(|b| b.as_u8()).collect();
        assert_eq!(values.len(), ButtonFlags::ALL.len());
    }

    #[test]
    fn test_button_round_trips_through_u8() {
        for &button in ButtonFlags::ALL {
            assert_eq!(ButtonFlags::try_from(button.as_u8()), Ok(button));
        }
        assert_eq!(ButtonFlags::try_from(0), Err(InputError::UnknownButton(0)));
    }

    #[test]
    fn test_stick_layout_channels() {
        assert_eq!(
            AxisLayoutFlags::LeftStick.channels(),
            AxisChannels::Dual {
                x: AxisFlags::LeftStickX,
                y: AxisFlags::LeftStickY
            }
        );
        assert_eq!(AxisLayoutFlags::R2.channels(), AxisChannels::Single(AxisFlags::R2));
        assert!(AxisLayoutFlags::L2.is_trigger());
        assert!(!AxisLayoutFlags::RightPad.is_trigger());
    }

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(ButtonFlags::OEM1.to_string(), "OEM1");
        assert_eq!(AxisFlags::RightPadY.to_string(), "RightPadY");
    }
}
