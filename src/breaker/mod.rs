//! Circuit breaker for downstream service protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: downstream assumed down, requests fail fast
//! - Half-Open: testing whether the downstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches failure_threshold
//! Open → Half-Open: open_timeout elapsed, next call admitted as trial
//! Half-Open → Closed: success_count reaches success_threshold
//! Half-Open → Open: any trial failure
//! ```
//!
//! # Design Decisions
//! - One breaker per downstream service name (not global)
//! - All state lives in the shared store; the breaker struct is immutable,
//!   so every gateway replica sees the same admission decisions
//! - No locks or check-and-set: transitions are idempotent under
//!   interleaving, a concurrent double-trip converges on Open
//! - Record expiry in the store is the idle reset back to Closed

pub mod breaker;
pub mod config;
pub mod state;

pub use breaker::{BreakerError, CircuitBreaker};
pub use config::BreakerConfig;
pub use state::{BreakerSnapshot, BreakerState};
