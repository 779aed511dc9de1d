use std::time::Duration;

use simplestep_session::SessionConfig;

/// Default time step between setpoint rewrites in the soft ramps.
pub const DEFAULT_RAMP_STEP: Duration = Duration::from_millis(100);

/// Configuration for a [`Device`](crate::Device).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Timeouts and retry budget for each round trip.
    pub session: SessionConfig,
    /// Interval between position-error polls in point-to-point moves.
    pub poll_interval: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            poll_interval: Duration::from_millis(100),
        }
    }
}
