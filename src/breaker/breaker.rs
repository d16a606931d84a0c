//! Shared-store circuit breaker.
//!
//! # Responsibilities
//! - Decide whether a call to one downstream service is admitted
//! - Record call outcomes and drive the state machine
//! - Own all store key construction; callers never touch keys
//!
//! # Design Decisions
//! - Every call reads state from the store and writes outcomes back; the
//!   breaker itself is immutable and safe to share across replicas
//! - Store read failures read as "no record" and write failures are logged
//!   and dropped: the gateway keeps serving when the bookkeeping store
//!   hiccups, it never rejects traffic because of it
//! - The Closed state is represented by absence: transitions into Closed
//!   delete every key, which makes an unseen service and a recovered one
//!   indistinguishable

use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::observability::metrics;
use crate::store::SharedStore;

use super::config::BreakerConfig;
use super::state::{BreakerSnapshot, BreakerState};

/// Error returned by a guarded call.
#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    /// Admission was refused; the operation was never invoked.
    #[error("circuit open for service `{service}`")]
    Open { service: String },

    /// The operation was admitted and failed; recorded against the breaker
    /// and propagated unchanged.
    #[error("downstream call failed: {0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Store keys, one per logical field, namespaced by service name.
mod keys {
    pub fn state(service: &str) -> String {
        format!("cb:{service}:state")
    }

    pub fn failures(service: &str) -> String {
        format!("cb:{service}:failures")
    }

    pub fn successes(service: &str) -> String {
        format!("cb:{service}:successes")
    }

    pub fn opened_at(service: &str) -> String {
        format!("cb:{service}:opened_at")
    }
}

/// Which state a call was admitted under; decides outcome bookkeeping.
enum Admission {
    Closed,
    Trial,
}

/// Circuit breaker guarding calls to one downstream service.
pub struct CircuitBreaker {
    service: String,
    config: BreakerConfig,
    store: Arc<dyn SharedStore>,
}

impl CircuitBreaker {
    pub fn new(
        service: impl Into<String>,
        config: BreakerConfig,
        store: Arc<dyn SharedStore>,
    ) -> Self {
        Self {
            service: service.into(),
            config,
            store,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Run `op` through the breaker.
    ///
    /// Returns the operation's result on success. Returns
    /// [`BreakerError::Open`] without invoking `op` when admission is
    /// refused. Propagates the operation's own error, after recording it as
    /// a failure, when an admitted call fails. Any error is a failure; the
    /// breaker does not distinguish kinds.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let admission = match self.admit().await {
            Some(admission) => admission,
            None => {
                metrics::record_breaker_rejection(&self.service);
                return Err(BreakerError::Open {
                    service: self.service.clone(),
                });
            }
        };

        match op().await {
            Ok(value) => {
                self.on_success(admission).await;
                Ok(value)
            }
            Err(err) => {
                self.on_failure(admission).await;
                Err(BreakerError::Inner(err))
            }
        }
    }

    /// Current snapshot for observability. Causes no state transition and
    /// no admission check; a service with no record reports Closed with
    /// zero counters.
    pub async fn status(&self) -> BreakerSnapshot {
        let state = self.read_state().await;
        BreakerSnapshot {
            state,
            failure_count: self.read_counter(&keys::failures(&self.service)).await,
            success_count: self.read_counter(&keys::successes(&self.service)).await,
            failure_threshold: self.config.failure_threshold,
            success_threshold: self.config.success_threshold,
            timeout: self.config.open_timeout.as_secs(),
            opened_at: if state.is_open() {
                self.read_opened_at().await
            } else {
                None
            },
        }
    }

    async fn admit(&self) -> Option<Admission> {
        match self.read_state().await {
            BreakerState::Closed => Some(Admission::Closed),
            BreakerState::HalfOpen => Some(Admission::Trial),
            BreakerState::Open => {
                // A missing opened_at means the record partially expired;
                // the elapsed check then always passes.
                let opened_at = self.read_opened_at().await.unwrap_or(0);
                if unix_now().saturating_sub(opened_at) >= self.config.open_timeout.as_secs() {
                    self.enter_half_open().await;
                    Some(Admission::Trial)
                } else {
                    None
                }
            }
        }
    }

    async fn on_success(&self, admission: Admission) {
        match admission {
            Admission::Closed => {
                // A success while Closed resets the failure streak.
                self.delete(&keys::failures(&self.service)).await;
            }
            Admission::Trial => {
                let successes = self.read_counter(&keys::successes(&self.service)).await + 1;
                if successes >= self.config.success_threshold {
                    self.reset().await;
                } else {
                    self.put(
                        &keys::successes(&self.service),
                        &successes.to_string(),
                        self.config.state_ttl,
                    )
                    .await;
                    // Keep the trial window alive for the next probe.
                    self.put(
                        &keys::state(&self.service),
                        BreakerState::HalfOpen.name(),
                        self.config.half_open_timeout,
                    )
                    .await;
                }
            }
        }
    }

    async fn on_failure(&self, admission: Admission) {
        match admission {
            Admission::Closed => {
                let failures = self.read_counter(&keys::failures(&self.service)).await + 1;
                if failures >= self.config.failure_threshold {
                    self.trip().await;
                } else {
                    self.put(
                        &keys::failures(&self.service),
                        &failures.to_string(),
                        self.config.state_ttl,
                    )
                    .await;
                }
            }
            // A single failure during the trial retrips, no partial credit.
            Admission::Trial => self.trip().await,
        }
    }

    /// Transition into Open: stamp opened_at, clear both counters.
    async fn trip(&self) {
        self.put(
            &keys::state(&self.service),
            BreakerState::Open.name(),
            self.config.state_ttl,
        )
        .await;
        self.put(
            &keys::opened_at(&self.service),
            &unix_now().to_string(),
            self.config.state_ttl,
        )
        .await;
        self.delete(&keys::failures(&self.service)).await;
        self.delete(&keys::successes(&self.service)).await;

        metrics::record_breaker_transition(&self.service, "open");
        tracing::warn!(service = %self.service, "circuit opened");
    }

    /// Transition into Closed: drop the whole record.
    async fn reset(&self) {
        self.delete(&keys::state(&self.service)).await;
        self.delete(&keys::opened_at(&self.service)).await;
        self.delete(&keys::failures(&self.service)).await;
        self.delete(&keys::successes(&self.service)).await;

        metrics::record_breaker_transition(&self.service, "closed");
        tracing::info!(service = %self.service, "circuit closed");
    }

    /// Optimistic Open → Half-Open transition before a trial call.
    async fn enter_half_open(&self) {
        self.put(
            &keys::state(&self.service),
            BreakerState::HalfOpen.name(),
            self.config.half_open_timeout,
        )
        .await;
        self.delete(&keys::opened_at(&self.service)).await;

        metrics::record_breaker_transition(&self.service, "half_open");
        tracing::info!(service = %self.service, "circuit half-open, admitting trial");
    }

    async fn read_state(&self) -> BreakerState {
        self.read(&keys::state(&self.service))
            .await
            .and_then(|v| BreakerState::parse(&v))
            .unwrap_or_default()
    }

    async fn read_opened_at(&self) -> Option<u64> {
        self.read(&keys::opened_at(&self.service))
            .await
            .and_then(|v| v.parse().ok())
    }

    async fn read_counter(&self, key: &str) -> u32 {
        self.read(key)
            .await
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    service = %self.service,
                    key,
                    error = %err,
                    "breaker state read failed, treating as absent"
                );
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: std::time::Duration) {
        if let Err(err) = self.store.put(key, value, Some(ttl)).await {
            tracing::warn!(
                service = %self.service,
                key,
                error = %err,
                "breaker state write failed"
            );
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(err) = self.store.delete(key).await {
            tracing::warn!(
                service = %self.service,
                key,
                error = %err,
                "breaker state delete failed"
            );
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
