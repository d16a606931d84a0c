//! Circuit breaker tunables.

use std::time::Duration;

use crate::config::schema::BreakerSettings;

/// Configuration for one circuit breaker. Not persisted; supplied at
/// construction and may differ by service.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Failures accumulated while Closed before tripping.
    pub failure_threshold: u32,

    /// Consecutive successes while Half-Open before fully closing.
    pub success_threshold: u32,

    /// Minimum time the circuit stays Open before a trial is allowed.
    pub open_timeout: Duration,

    /// How long a half-open trial window may remain outstanding; applied as
    /// the TTL of the half-open state record so an abandoned trial expires
    /// back to Closed.
    pub half_open_timeout: Duration,

    /// Storage TTL on every persisted field. Expiry is the idle reset to
    /// Closed.
    pub state_ttl: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_timeout: Duration::from_secs(60),
            half_open_timeout: Duration::from_secs(30),
            state_ttl: Duration::from_secs(3600),
        }
    }
}

impl BreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn with_half_open_timeout(mut self, timeout: Duration) -> Self {
        self.half_open_timeout = timeout;
        self
    }

    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }
}

impl From<&BreakerSettings> for BreakerConfig {
    fn from(settings: &BreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            success_threshold: settings.success_threshold,
            open_timeout: Duration::from_secs(settings.open_timeout_secs),
            half_open_timeout: Duration::from_secs(settings.half_open_timeout_secs),
            state_ttl: Duration::from_secs(settings.state_ttl_secs),
        }
    }
}
