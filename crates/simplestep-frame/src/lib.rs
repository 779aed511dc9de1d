//! Fixed-size, type-tagged frames for the simple_step USB protocol.
//!
//! Every exchange is a single 8-byte frame in each direction:
//! - a 1-byte command id, echoed back by the device
//! - a 1-byte control tag (update flag on set requests, payload type on responses)
//! - a little-endian integer payload sized by the payload type
//!
//! The [`command`] module holds the static registry of command ids.

pub mod codec;
pub mod command;
pub mod error;

pub use codec::{
    decode, encode_get, encode_set, Decoded, Frame, Update, ValueType, CTL_NO_UPDATE, CTL_UPDATE,
    HEADER_SIZE,
};
pub use command::{command_name, lookup, set_value_type, Access, CommandSpec, COMMANDS};
pub use error::{FrameError, Result};
