use crate::codec::ValueType;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The response control byte is not a known payload type tag.
    #[error("unknown value type tag {0}")]
    UnknownValueType(u8),

    /// The value does not fit the payload type declared for the command.
    #[error("value {value} out of range for {value_type}")]
    ValueOutOfRange { value: i64, value_type: ValueType },

    /// The command id has no settable value in the registry.
    #[error("command {0} is not a set command")]
    NotSettable(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;
