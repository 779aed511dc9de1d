use std::fmt;

use bytes::{Buf, BufMut};
use simplestep_transport::{Packet, PACKET_SIZE};

use crate::error::{FrameError, Result};

/// Frame header: command id (1) + control byte (1).
pub const HEADER_SIZE: usize = 2;

/// Control byte on a set request: apply the value immediately.
pub const CTL_UPDATE: u8 = 200;

/// Control byte on a set request: stage the value until the next update.
pub const CTL_NO_UPDATE: u8 = 201;

/// Integer payload types carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Uint8,
    Uint16,
    Int32,
}

impl ValueType {
    /// Type tag carried in the control byte of a response.
    pub const fn tag(self) -> u8 {
        match self {
            ValueType::Uint8 => 0,
            ValueType::Uint16 => 1,
            ValueType::Int32 => 2,
        }
    }

    /// Parse a response type tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ValueType::Uint8),
            1 => Ok(ValueType::Uint16),
            2 => Ok(ValueType::Int32),
            other => Err(FrameError::UnknownValueType(other)),
        }
    }

    /// Payload width in bytes.
    pub const fn width(self) -> usize {
        match self {
            ValueType::Uint8 => 1,
            ValueType::Uint16 => 2,
            ValueType::Int32 => 4,
        }
    }

    /// Inclusive range of representable values.
    pub const fn range(self) -> (i64, i64) {
        match self {
            ValueType::Uint8 => (0, u8::MAX as i64),
            ValueType::Uint16 => (0, u16::MAX as i64),
            ValueType::Int32 => (i32::MIN as i64, i32::MAX as i64),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Uint8 => "uint8",
            ValueType::Uint16 => "uint16",
            ValueType::Int32 => "int32",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a set request takes effect now or is staged for the next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Update {
    /// Apply this value, together with anything staged before it.
    #[default]
    Apply,
    /// Hold this value until the next [`Update::Apply`] set.
    Stage,
}

impl Update {
    pub const fn control(self) -> u8 {
        match self {
            Update::Apply => CTL_UPDATE,
            Update::Stage => CTL_NO_UPDATE,
        }
    }
}

/// One fixed-size protocol frame.
///
/// Wire format:
/// ```text
/// ┌────────────┬────────────┬──────────────────────────────┐
/// │ Command id │ Control    │ Payload (LE, zero padded)    │
/// │ (1B)       │ (1B)       │ (6B, 1/2/4 used by type)     │
/// └────────────┴────────────┴──────────────────────────────┘
/// ```
/// On a set request the control byte is [`CTL_UPDATE`] or [`CTL_NO_UPDATE`];
/// on every response it is the payload [`ValueType`] tag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: Packet,
}

impl Frame {
    pub const fn from_bytes(bytes: Packet) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &Packet {
        &self.bytes
    }

    pub const fn command_id(&self) -> u8 {
        self.bytes[0]
    }

    pub const fn control(&self) -> u8 {
        self.bytes[1]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame {{ cmd: {}, ctl: {}, payload: {:02x?} }}",
            self.command_id(),
            self.control(),
            self.payload()
        )
    }
}

/// A decoded response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub command_id: u8,
    pub value_type: ValueType,
    pub value: i64,
}

/// Encode a get request (or any header-only command).
pub fn encode_get(command_id: u8) -> Frame {
    let mut bytes = [0u8; PACKET_SIZE];
    bytes[0] = command_id;
    Frame::from_bytes(bytes)
}

/// Encode a set request carrying `value` as `value_type`.
pub fn encode_set(
    command_id: u8,
    value: i64,
    value_type: ValueType,
    update: Update,
) -> Result<Frame> {
    let (min, max) = value_type.range();
    if value < min || value > max {
        return Err(FrameError::ValueOutOfRange { value, value_type });
    }

    let mut bytes = [0u8; PACKET_SIZE];
    bytes[0] = command_id;
    bytes[1] = update.control();
    put_value(&mut bytes[HEADER_SIZE..], value, value_type);
    Ok(Frame::from_bytes(bytes))
}

/// Decode a response frame using the type tag in its control byte.
pub fn decode(frame: &Frame) -> Result<Decoded> {
    let value_type = ValueType::from_tag(frame.control())?;
    Ok(Decoded {
        command_id: frame.command_id(),
        value_type,
        value: get_value(frame.payload(), value_type),
    })
}

fn put_value(mut dst: &mut [u8], value: i64, value_type: ValueType) {
    // Range already checked by the caller.
    match value_type {
        ValueType::Uint8 => dst.put_u8(value as u8),
        ValueType::Uint16 => dst.put_u16_le(value as u16),
        ValueType::Int32 => dst.put_i32_le(value as i32),
    }
}

fn get_value(mut src: &[u8], value_type: ValueType) -> i64 {
    match value_type {
        ValueType::Uint8 => i64::from(src.get_u8()),
        ValueType::Uint16 => i64::from(src.get_u16_le()),
        ValueType::Int32 => {
            let raw = i64::from(src.get_u32_le());
            if raw > i64::from(i32::MAX) {
                raw - (1i64 << 32)
            } else {
                raw
            }
        }
    }
}
