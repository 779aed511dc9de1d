use simplestep_frame::{
    command_name, decode, encode_get, encode_set, set_value_type, Frame, FrameError, Update,
};
use simplestep_transport::{RawTransport, TransportError, PACKET_SIZE};
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// A request/response session with one controller.
///
/// Each exchange writes one frame and reads one frame. A read that yields no
/// data resends the identical request, up to [`SessionConfig::max_attempts`]
/// times. All methods take `&mut self`, so at most one request is ever in
/// flight on a session.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    config: SessionConfig,
}

impl<T: RawTransport> Session<T> {
    /// Create a session with default timeouts and retry budget.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self { transport, config }
    }

    /// Send `request` and return the device's response.
    ///
    /// Fails with [`SessionError::ProtocolDesync`] as soon as a response echoes
    /// the wrong command id, and with [`SessionError::Timeout`] once the retry
    /// budget is spent.
    pub fn exchange(&mut self, request: &Frame) -> Result<Frame> {
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            self.write(request)?;

            let Some(bytes) = self.transport.read(self.config.read_timeout)? else {
                debug!(
                    cmd = command_name(request.command_id()),
                    attempt, "no data from device, resending"
                );
                continue;
            };

            let response = Frame::from_bytes(bytes);
            trace!(?request, ?response, "exchange complete");

            if response.command_id() != request.command_id() {
                warn!(
                    expected = request.command_id(),
                    received = response.command_id(),
                    "command id echo mismatch"
                );
                return Err(SessionError::ProtocolDesync {
                    expected: request.command_id(),
                    received: response.command_id(),
                });
            }
            return Ok(response);
        }

        warn!(
            cmd = command_name(request.command_id()),
            attempts, "retry budget exhausted"
        );
        Err(SessionError::Timeout { attempts })
    }

    /// Write `request` without waiting for a response.
    ///
    /// Used for commands after which the device resets and never answers.
    pub fn send_only(&mut self, request: &Frame) -> Result<()> {
        trace!(?request, "send without response");
        self.write(request)
    }

    /// Issue a get command and return the decoded value.
    pub fn get(&mut self, command_id: u8) -> Result<i64> {
        let response = self.exchange(&encode_get(command_id))?;
        Ok(decode(&response)?.value)
    }

    /// Issue a set command and return the value the device reports back.
    ///
    /// The payload width comes from the command registry.
    pub fn set(&mut self, command_id: u8, value: i64, update: Update) -> Result<i64> {
        let value_type = set_value_type(command_id).ok_or(FrameError::NotSettable(command_id))?;
        let request = encode_set(command_id, value, value_type, update)?;
        let response = self.exchange(&request)?;
        Ok(decode(&response)?.value)
    }

    /// Current session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn write(&mut self, request: &Frame) -> Result<()> {
        let written = self
            .transport
            .write(request.as_bytes(), self.config.write_timeout)?;
        if written != PACKET_SIZE {
            return Err(TransportError::ShortWrite {
                written,
                expected: PACKET_SIZE,
            }
            .into());
        }
        Ok(())
    }
}
