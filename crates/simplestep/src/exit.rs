use std::fmt;
use std::io;

use simplestep_device::DeviceError;
use simplestep_session::SessionError;
use simplestep_transport::{TransportError, UsbError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NOT_FOUND: i32 = 69;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => NOT_FOUND,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::NotFound { .. } => CliError::new(NOT_FOUND, format!("{context}: {err}")),
        TransportError::Usb { source, .. } => {
            let code = match source {
                UsbError::Access => PERMISSION_DENIED,
                UsbError::NoDevice | UsbError::NotFound => NOT_FOUND,
                UsbError::Timeout => TIMEOUT,
                _ => TRANSPORT_ERROR,
            };
            CliError::new(code, format!("{context}: {err}"))
        }
        TransportError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        SessionError::ProtocolDesync { .. } | SessionError::Frame(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Session(err) => session_error(context, err),
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Validation(_) => CliError::new(USAGE, format!("{context}: {err}")),
        DeviceError::UnexpectedValue { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}
