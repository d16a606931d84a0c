//! Shared breaker state storage.
//!
//! # Data Flow
//! ```text
//! breaker reads/writes per-field keys
//!     → SharedStore trait (get / put-with-ttl / delete)
//!     → MemoryStore (single node, tests)
//!     → or a distributed cache client behind the same trait
//! ```
//!
//! # Design Decisions
//! - Values are plain strings; the breaker owns encoding
//! - Per-key TTL is the only expiry mechanism (drives idle reset)
//! - The trait is async so a networked backend needs no breaker changes

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::time::Duration;

/// Error from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Key-value store with per-key TTL, visible to all gateway replicas.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Fetch a value. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one. `ttl` of `None` means the
    /// entry does not expire.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
