/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Request/response exchange failed.
    #[error("session error: {0}")]
    Session(#[from] simplestep_session::SessionError),

    /// Opening or talking to the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] simplestep_transport::TransportError),

    /// Caller input is outside the field's domain. Raised before any frame is sent.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The device reported a value outside the field's domain.
    #[error("device reported unexpected {field} value {value}")]
    UnexpectedValue { field: &'static str, value: i64 },
}

impl DeviceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
