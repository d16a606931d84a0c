//! HTTP server setup and proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Match requests to a downstream service by path prefix
//! - Hand the outbound call to the guarded dispatcher

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::GatewayConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::request::{GatewayRequestId, X_REQUEST_ID};
use crate::http::routes::ServiceTable;
use crate::observability::metrics;
use crate::store::SharedStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ServiceTable>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and shared
    /// breaker state store.
    pub fn new(config: GatewayConfig, store: Arc<dyn SharedStore>) -> Self {
        let state = AppState {
            table: Arc::new(ServiceTable::from_config(&config.services)),
            dispatcher: Arc::new(Dispatcher::new(&config, store)),
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(crate::admin::admin_router(state));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(GatewayRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler. Matches a downstream service by path prefix and
/// forwards the request through the guarded dispatcher.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "proxying request"
    );

    let service = match state.table.match_path(&path) {
        Some(service) => service.clone(),
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "no service for path");
            metrics::record_request(&method, 404, "none", start);
            return (StatusCode::NOT_FOUND, "no service for this path").into_response();
        }
    };

    // Rewrite the URI toward the downstream authority, keeping path and query.
    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = match Authority::from_str(&service.address) {
        Ok(authority) => Some(authority),
        Err(err) => {
            tracing::error!(service = %service.name, error = %err, "bad downstream address");
            metrics::record_request(&method, 500, &service.name, start);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| parts.uri.clone());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(header::HeaderName::from_static(X_REQUEST_ID), value);
    }

    let outbound = Request::from_parts(parts, body);
    let response = state.dispatcher.dispatch(&service.name, outbound).await;

    metrics::record_request(&method, response.status().as_u16(), &service.name, start);
    response.into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
