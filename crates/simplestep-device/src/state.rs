//! Enumerated device fields and their wire encodings.
//!
//! Each field is a closed enum with two explicit conversions: [`to_wire`] for
//! requests and [`from_wire`] for responses. The symbolic form (`"position"`,
//! `"negative"`, ...) is available through `Display` and `FromStr`.
//!
//! [`to_wire`]: Mode::to_wire
//! [`from_wire`]: Mode::from_wire

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{DeviceError, Result};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident = $wire:literal => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Wire value sent to the device.
            pub const fn to_wire(self) -> u8 {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Parse a value reported by the device.
            pub fn from_wire(value: i64) -> Result<Self> {
                match value {
                    $($wire => Ok($name::$variant),)+
                    other => Err(DeviceError::UnexpectedValue {
                        field: $field,
                        value: other,
                    }),
                }
            }

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        /// Accepts the symbolic name (case-insensitive) or the decimal wire value.
        impl FromStr for $name {
            type Err = DeviceError;

            fn from_str(s: &str) -> Result<Self> {
                let trimmed = s.trim();
                if let Ok(value) = trimmed.parse::<i64>() {
                    return Self::from_wire(value).map_err(|_| {
                        DeviceError::validation(format!("unknown {} value {value}", $field))
                    });
                }
                match trimmed.to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(DeviceError::validation(format!(
                        "unknown {} '{trimmed}'",
                        $field
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Operating mode. Switching modes requires the device to be stopped.
    Mode, "mode" {
        /// Spin at the velocity setpoint in the direction setpoint.
        Velocity = 0 => "velocity",
        /// Track the position setpoint at the positioning velocity.
        Position = 1 => "position",
    }
}

wire_enum! {
    /// Rotation direction. Velocity magnitudes are always non-negative.
    Direction, "direction" {
        Positive = 0 => "positive",
        Negative = 1 => "negative",
    }
}

wire_enum! {
    /// Run status.
    Status, "status" {
        Stopped = 0 => "stopped",
        Running = 1 => "running",
    }
}

wire_enum! {
    /// Drive enable pin and external interrupt setting.
    Enable, "enable" {
        Disabled = 0 => "disabled",
        Enabled = 1 => "enabled",
    }
}

impl Direction {
    /// `+1` for positive, `-1` for negative.
    pub const fn sign(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// Direction of a signed velocity; zero counts as positive.
    pub const fn of(signed: i64) -> Self {
        if signed < 0 {
            Direction::Negative
        } else {
            Direction::Positive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_firmware() {
        assert_eq!(Mode::Velocity.to_wire(), 0);
        assert_eq!(Mode::Position.to_wire(), 1);
        assert_eq!(Direction::Positive.to_wire(), 0);
        assert_eq!(Direction::Negative.to_wire(), 1);
        assert_eq!(Status::Stopped.to_wire(), 0);
        assert_eq!(Status::Running.to_wire(), 1);
        assert_eq!(Enable::Disabled.to_wire(), 0);
        assert_eq!(Enable::Enabled.to_wire(), 1);
    }

    #[test]
    fn from_wire_rejects_unknown_values() {
        assert_eq!(Mode::from_wire(1).unwrap(), Mode::Position);
        assert!(matches!(
            Status::from_wire(7),
            Err(DeviceError::UnexpectedValue {
                field: "status",
                value: 7
            })
        ));
    }

    #[test]
    fn parse_symbolic_and_numeric() {
        assert_eq!("position".parse::<Mode>().unwrap(), Mode::Position);
        assert_eq!("  Negative ".parse::<Direction>().unwrap(), Direction::Negative);
        assert_eq!("1".parse::<Enable>().unwrap(), Enable::Enabled);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(DeviceError::Validation(_))
        ));
        assert!(matches!("5".parse::<Mode>(), Err(DeviceError::Validation(_))));
    }

    #[test]
    fn display_is_symbolic() {
        assert_eq!(Mode::Position.to_string(), "position");
        assert_eq!(Status::Running.to_string(), "running");
    }

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::Negative.sign(), -1);
        assert_eq!(Direction::of(-3), Direction::Negative);
        assert_eq!(Direction::of(0), Direction::Positive);
    }
}
