//! HTTP proxy subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → routes.rs (path prefix → downstream service)
//!     → dispatch.rs (circuit breaker + outbound hyper call)
//!     → response passed back to the client
//! ```

pub mod dispatch;
pub mod request;
pub mod routes;
pub mod server;

pub use dispatch::{BreakerRegistry, Dispatcher};
pub use routes::ServiceTable;
pub use server::HttpServer;
