/// Errors that can occur during a request/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] simplestep_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] simplestep_frame::FrameError),

    /// The response echoed a different command id than the request carried.
    /// The byte stream is out of step with the device; never retried.
    #[error("protocol desync: sent command {expected}, device answered {received}")]
    ProtocolDesync { expected: u8, received: u8 },

    /// Every read attempt returned no data.
    #[error("no response after {attempts} attempts")]
    Timeout { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, SessionError>;
