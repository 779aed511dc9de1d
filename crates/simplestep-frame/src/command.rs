//! Command ids and the static command registry.
//!
//! Set commands carry a payload whose width is fixed by the registry. Get
//! commands report their payload type in the response control byte. Action
//! commands are header-only and the device does not answer them.

use crate::codec::ValueType;

pub const GET_POS: u8 = 0;
pub const SET_POS_SETPT: u8 = 1;
pub const GET_POS_SETPT: u8 = 2;
pub const SET_VEL_SETPT: u8 = 3;
pub const GET_VEL_SETPT: u8 = 4;
pub const GET_VEL: u8 = 5;
pub const SET_DIR_SETPT: u8 = 6;
pub const GET_DIR_SETPT: u8 = 7;
pub const SET_MODE: u8 = 8;
pub const GET_MODE: u8 = 9;
pub const SET_POS_VEL: u8 = 10;
pub const GET_POS_VEL: u8 = 11;
pub const GET_POS_ERR: u8 = 12;
pub const SET_ZERO_POS: u8 = 13;
pub const GET_MAX_VEL: u8 = 14;
pub const GET_MIN_VEL: u8 = 15;
pub const GET_STATUS: u8 = 16;
pub const SET_STATUS: u8 = 17;
pub const GET_DIR: u8 = 18;
pub const SET_ENABLE: u8 = 19;
pub const GET_ENABLE: u8 = 20;
pub const SET_DIO_HI: u8 = 21;
pub const SET_DIO_LO: u8 = 22;
pub const GET_EXT_INT: u8 = 23;
pub const SET_EXT_INT: u8 = 24;
pub const AVR_RESET: u8 = 200;
pub const AVR_DFU_MODE: u8 = 201;
pub const TEST: u8 = 251;

/// How a command is exchanged with the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Request without payload; the response carries the value.
    Get,
    /// Request carries a value of the given type; the response echoes the result.
    Set(ValueType),
    /// Request without payload; the device does not respond.
    Action,
}

/// Registry entry for one command id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: u8,
    pub name: &'static str,
    pub access: Access,
}

const fn get(id: u8, name: &'static str) -> CommandSpec {
    CommandSpec {
        id,
        name,
        access: Access::Get,
    }
}

const fn set(id: u8, name: &'static str, value_type: ValueType) -> CommandSpec {
    CommandSpec {
        id,
        name,
        access: Access::Set(value_type),
    }
}

const fn action(id: u8, name: &'static str) -> CommandSpec {
    CommandSpec {
        id,
        name,
        access: Access::Action,
    }
}

/// Every command understood by the firmware.
pub const COMMANDS: [CommandSpec; 28] = [
    get(GET_POS, "GET_POS"),
    set(SET_POS_SETPT, "SET_POS_SETPT", ValueType::Int32),
    get(GET_POS_SETPT, "GET_POS_SETPT"),
    set(SET_VEL_SETPT, "SET_VEL_SETPT", ValueType::Uint16),
    get(GET_VEL_SETPT, "GET_VEL_SETPT"),
    get(GET_VEL, "GET_VEL"),
    set(SET_DIR_SETPT, "SET_DIR_SETPT", ValueType::Uint8),
    get(GET_DIR_SETPT, "GET_DIR_SETPT"),
    set(SET_MODE, "SET_MODE", ValueType::Uint8),
    get(GET_MODE, "GET_MODE"),
    set(SET_POS_VEL, "SET_POS_VEL", ValueType::Uint16),
    get(GET_POS_VEL, "GET_POS_VEL"),
    get(GET_POS_ERR, "GET_POS_ERR"),
    set(SET_ZERO_POS, "SET_ZERO_POS", ValueType::Int32),
    get(GET_MAX_VEL, "GET_MAX_VEL"),
    get(GET_MIN_VEL, "GET_MIN_VEL"),
    get(GET_STATUS, "GET_STATUS"),
    set(SET_STATUS, "SET_STATUS", ValueType::Uint8),
    get(GET_DIR, "GET_DIR"),
    set(SET_ENABLE, "SET_ENABLE", ValueType::Uint8),
    get(GET_ENABLE, "GET_ENABLE"),
    set(SET_DIO_HI, "SET_DIO_HI", ValueType::Uint8),
    set(SET_DIO_LO, "SET_DIO_LO", ValueType::Uint8),
    get(GET_EXT_INT, "GET_EXT_INT"),
    set(SET_EXT_INT, "SET_EXT_INT", ValueType::Uint8),
    action(AVR_RESET, "AVR_RESET"),
    action(AVR_DFU_MODE, "AVR_DFU_MODE"),
    set(TEST, "TEST", ValueType::Uint8),
];

/// Look up a command by id.
pub fn lookup(id: u8) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.id == id)
}

/// Payload type of a set command, or `None` if `id` is not settable.
pub fn set_value_type(id: u8) -> Option<ValueType> {
    match lookup(id)?.access {
        Access::Set(value_type) => Some(value_type),
        Access::Get | Access::Action => None,
    }
}

/// Returns a human-readable name for a command id.
pub fn command_name(id: u8) -> &'static str {
    lookup(id).map_or("UNKNOWN", |spec| spec.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.id, b.id, "{} and {} share an id", a.name, b.name);
            }
        }
    }

    #[test]
    fn set_types_match_device_fields() {
        assert_eq!(set_value_type(SET_POS_SETPT), Some(ValueType::Int32));
        assert_eq!(set_value_type(SET_ZERO_POS), Some(ValueType::Int32));
        assert_eq!(set_value_type(SET_VEL_SETPT), Some(ValueType::Uint16));
        assert_eq!(set_value_type(SET_POS_VEL), Some(ValueType::Uint16));
        assert_eq!(set_value_type(SET_MODE), Some(ValueType::Uint8));
        assert_eq!(set_value_type(SET_DIO_LO), Some(ValueType::Uint8));
        assert_eq!(set_value_type(TEST), Some(ValueType::Uint8));
    }

    #[test]
    fn gets_and_actions_are_not_settable() {
        assert_eq!(set_value_type(GET_POS), None);
        assert_eq!(set_value_type(AVR_DFU_MODE), None);
        assert_eq!(set_value_type(150), None);
    }

    #[test]
    fn names() {
        assert_eq!(command_name(GET_POS_ERR), "GET_POS_ERR");
        assert_eq!(command_name(AVR_RESET), "AVR_RESET");
        assert_eq!(command_name(99), "UNKNOWN");
    }
}
