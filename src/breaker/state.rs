//! Breaker state machine vocabulary.

use serde::Serialize;

/// The current state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    /// Circuit is closed; requests pass through normally.
    #[default]
    Closed,
    /// Circuit is open; requests are rejected without calling downstream.
    Open,
    /// Circuit is half-open; a trial request is allowed through.
    HalfOpen,
}

impl BreakerState {
    /// Wire name of the state, as persisted in the shared store.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }

    /// Parse a persisted state value. Anything unrecognized reads as absent.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "closed" => Some(Self::Closed),
            "open" => Some(Self::Open),
            "half_open" => Some(Self::HalfOpen),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_half_open(&self) -> bool {
        matches!(self, Self::HalfOpen)
    }
}

/// Read-only view of one breaker, for the status endpoint and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub failure_count: u32,
    pub success_count: u32,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    /// Open timeout in seconds.
    pub timeout: u64,
    /// Unix timestamp of the last trip. Present only while Open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_round_trip() {
        for state in [BreakerState::Closed, BreakerState::Open, BreakerState::HalfOpen] {
            assert_eq!(BreakerState::parse(state.name()), Some(state));
        }
        assert_eq!(BreakerState::parse("degraded"), None);
        assert_eq!(BreakerState::parse(""), None);
    }

    #[test]
    fn test_default_is_closed() {
        assert!(BreakerState::default().is_closed());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = BreakerSnapshot {
            state: BreakerState::HalfOpen,
            failure_count: 0,
            success_count: 1,
            failure_threshold: 5,
            success_threshold: 2,
            timeout: 60,
            opened_at: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "half_open");
        assert_eq!(json["success_count"], 1);
        assert!(json.get("opened_at").is_none());
    }
}
