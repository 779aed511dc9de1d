use std::time::Duration;

/// Timeouts and retry budget for a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bulk-IN timeout for each read attempt.
    pub read_timeout: Duration,
    /// Bulk-OUT timeout for each write.
    pub write_timeout: Duration,
    /// Maximum write+read attempts for one exchange before giving up.
    pub max_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(200),
            write_timeout: Duration::from_millis(9999),
            max_attempts: 25,
        }
    }
}
