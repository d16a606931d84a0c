//! Gateway for the organization, quiz/team/league and results services.
//!
//! Browser traffic lands here and is proxied to one of the downstream
//! services by path prefix. Every outbound call runs through a per-service
//! circuit breaker whose state lives in a shared key-value store, so any
//! number of gateway replicas converge on the same admission decisions
//! without in-process state or locks.

// Core subsystems
pub mod breaker;
pub mod config;
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod admin;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
