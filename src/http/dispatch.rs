//! Guarded proxy dispatch.
//!
//! # Responsibilities
//! - Run one outbound call through the target service's circuit breaker
//! - Normalize the three outcomes into uniform responses:
//!   breaker rejection → 503 `circuit_open`, transport failure on an
//!   admitted call → 502 `upstream_unreachable`, any response received from
//!   the downstream → passed through unchanged
//!
//! # Design Decisions
//! - The breaker measures reachability, not application status: a 4xx or
//!   5xx body from the downstream counts as a breaker success and is never
//!   reinterpreted here
//! - Dispatcher-level timeout bounds every outbound call; a timeout is a
//!   transport failure

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use dashmap::DashMap;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::breaker::{BreakerConfig, BreakerError, CircuitBreaker};
use crate::config::schema::GatewayConfig;
use crate::store::SharedStore;

/// Failure of an admitted outbound call, before any response was received.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("no response within {0:?}")]
    TimedOut(Duration),
}

/// Service name → circuit breaker, built lazily from config.
pub struct BreakerRegistry {
    store: Arc<dyn SharedStore>,
    defaults: BreakerConfig,
    overrides: HashMap<String, BreakerConfig>,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn from_config(config: &GatewayConfig, store: Arc<dyn SharedStore>) -> Self {
        let overrides = config
            .services
            .iter()
            .filter_map(|s| {
                s.breaker
                    .as_ref()
                    .map(|settings| (s.name.clone(), BreakerConfig::from(settings)))
            })
            .collect();

        Self {
            store,
            defaults: BreakerConfig::from(&config.breaker),
            overrides,
            breakers: DashMap::new(),
        }
    }

    /// Get (or lazily construct) the breaker for a service name.
    pub fn get(&self, service: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.get(service) {
            return breaker.clone();
        }

        let config = self
            .overrides
            .get(service)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone());
        let breaker = Arc::new(CircuitBreaker::new(service, config, self.store.clone()));
        self.breakers
            .entry(service.to_string())
            .or_insert(breaker)
            .clone()
    }
}

/// Adapts breaker-guarded outbound calls into uniform inbound responses.
pub struct Dispatcher {
    client: Client<HttpConnector, Body>,
    breakers: BreakerRegistry,
    upstream_timeout: Duration,
}

impl Dispatcher {
    pub fn new(config: &GatewayConfig, store: Arc<dyn SharedStore>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            breakers: BreakerRegistry::from_config(config, store),
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        }
    }

    pub fn breakers(&self) -> &BreakerRegistry {
        &self.breakers
    }

    /// Forward `request` to `service` through its circuit breaker.
    pub async fn dispatch(&self, service: &str, request: Request<Body>) -> Response<Body> {
        let breaker = self.breakers.get(service);
        let client = self.client.clone();
        let timeout = self.upstream_timeout;

        let result = breaker
            .call(|| async move {
                match tokio::time::timeout(timeout, client.request(request)).await {
                    Ok(Ok(response)) => Ok(response),
                    Ok(Err(err)) => Err(UpstreamError::Transport(err)),
                    Err(_) => Err(UpstreamError::TimedOut(timeout)),
                }
            })
            .await;

        match result {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Err(BreakerError::Open { .. }) => {
                tracing::warn!(service, "request rejected, circuit open");
                circuit_open_response(service)
            }
            Err(BreakerError::Inner(err)) => {
                tracing::error!(service, error = %err, "upstream request failed");
                unreachable_response(service)
            }
        }
    }
}

fn circuit_open_response(service: &str) -> Response<Body> {
    let body = serde_json::json!({
        "error": "circuit_open",
        "service": service,
        "message": "service temporarily unavailable, retry later",
    });
    Response::builder()
        .status(StatusCode::SERVICE_UNAVAILABLE)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-breaker", "open")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn unreachable_response(service: &str) -> Response<Body> {
    let body = serde_json::json!({
        "error": "upstream_unreachable",
        "service": service,
        "message": "downstream service did not respond",
    });
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BreakerSettings, ServiceConfig};
    use crate::store::MemoryStore;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn spawn_downstream() -> SocketAddr {
        let app = Router::new().route(
            "/orgs/ping",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn config_for(service: &str, address: &str, failure_threshold: u32) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.services = vec![ServiceConfig {
            name: service.to_string(),
            address: address.to_string(),
            path_prefix: "/orgs".to_string(),
            breaker: Some(BreakerSettings {
                failure_threshold,
                ..BreakerSettings::default()
            }),
        }];
        config.timeouts.upstream_secs = 2;
        config.timeouts.connect_secs = 1;
        config
    }

    fn outbound(addr: &str, path: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("http://{addr}{path}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_downstream_response_passes_through() {
        let addr = spawn_downstream().await;
        let addr_str = addr.to_string();
        let config = config_for("org-svc", &addr_str, 5);
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(&config, store);

        let response = dispatcher
            .dispatch("org-svc", outbound(&addr_str, "/orgs/ping"))
            .await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"short and stout");

        let snapshot = dispatcher.breakers().get("org-svc").status().await;
        assert!(snapshot.state.is_closed());
    }

    #[tokio::test]
    async fn test_downstream_error_status_passes_through_as_success() {
        let addr = spawn_downstream().await;
        let addr_str = addr.to_string();
        let config = config_for("org-svc", &addr_str, 1);
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(&config, store);

        // No route for this path downstream: a well-formed 404 comes back
        let response = dispatcher
            .dispatch("org-svc", outbound(&addr_str, "/orgs/missing"))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Even with threshold 1 the breaker stays closed: the service answered
        let snapshot = dispatcher.breakers().get("org-svc").status().await;
        assert!(snapshot.state.is_closed());
        assert_eq!(snapshot.failure_count, 0);
    }

    #[tokio::test]
    async fn test_unreachable_downstream_maps_to_502_and_trips() {
        // Nothing listens on the discard port
        let addr = "127.0.0.1:9";
        let config = config_for("org-svc", addr, 1);
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(&config, store);

        let response = dispatcher
            .dispatch("org-svc", outbound(addr, "/orgs/1"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "upstream_unreachable");
        assert_eq!(json["service"], "org-svc");

        let snapshot = dispatcher.breakers().get("org-svc").status().await;
        assert!(snapshot.state.is_open());

        // Next call is rejected without a connection attempt
        let response = dispatcher
            .dispatch("org-svc", outbound(addr, "/orgs/1"))
            .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["x-breaker"], "open");
        let json = body_json(response).await;
        assert_eq!(json["error"], "circuit_open");
    }

    #[tokio::test]
    async fn test_registry_uses_per_service_overrides() {
        let mut config = config_for("org-svc", "127.0.0.1:4001", 3);
        config.services.push(ServiceConfig {
            name: "quiz-svc".to_string(),
            address: "127.0.0.1:4002".to_string(),
            path_prefix: "/quizzes".to_string(),
            breaker: None,
        });
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let registry = BreakerRegistry::from_config(&config, store);

        assert_eq!(registry.get("org-svc").config().failure_threshold, 3);
        // quiz-svc falls back to the [breaker] defaults
        assert_eq!(registry.get("quiz-svc").config().failure_threshold, 5);
        // Same instance on repeat lookups
        assert!(Arc::ptr_eq(&registry.get("org-svc"), &registry.get("org-svc")));
    }
}
