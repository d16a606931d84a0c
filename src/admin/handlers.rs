use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::breaker::BreakerSnapshot;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Breaker state for every configured service, plus the snapshot time.
#[derive(Serialize)]
pub struct BreakerOverview {
    pub generated_at: u64,
    pub services: BTreeMap<String, BreakerSnapshot>,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Snapshot every configured service's breaker. Services that were never
/// called report closed with zero counters.
pub async fn list_breakers(State(state): State<AppState>) -> Json<BreakerOverview> {
    let mut services = BTreeMap::new();
    for name in state.table.names() {
        let snapshot = state.dispatcher.breakers().get(name).status().await;
        services.insert(name.to_string(), snapshot);
    }

    Json(BreakerOverview {
        generated_at: unix_now(),
        services,
    })
}

/// Single-service variant; 404 for names not in the service table.
pub async fn get_breaker(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Result<Json<BreakerSnapshot>, StatusCode> {
    if !state.table.contains(&service) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(state.dispatcher.breakers().get(&service).status().await))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{GatewayConfig, ServiceConfig};
    use crate::http::dispatch::Dispatcher;
    use crate::http::routes::ServiceTable;
    use crate::store::{MemoryStore, SharedStore};
    use std::sync::Arc;

    fn test_state() -> AppState {
        let mut config = GatewayConfig::default();
        config.services = vec![
            ServiceConfig {
                name: "org-svc".to_string(),
                address: "127.0.0.1:4001".to_string(),
                path_prefix: "/orgs".to_string(),
                breaker: None,
            },
            ServiceConfig {
                name: "quiz-svc".to_string(),
                address: "127.0.0.1:4002".to_string(),
                path_prefix: "/quizzes".to_string(),
                breaker: None,
            },
        ];

        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        AppState {
            table: Arc::new(ServiceTable::from_config(&config.services)),
            dispatcher: Arc::new(Dispatcher::new(&config, store)),
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn test_list_breakers_reports_all_services_closed() {
        let state = test_state();

        let Json(overview) = list_breakers(State(state)).await;
        assert!(overview.generated_at > 0);
        assert_eq!(overview.services.len(), 2);
        for snapshot in overview.services.values() {
            assert!(snapshot.state.is_closed());
            assert_eq!(snapshot.failure_count, 0);
            assert_eq!(snapshot.success_count, 0);
        }
    }

    #[tokio::test]
    async fn test_tripped_service_shows_open_others_closed() {
        let state = test_state();

        // Drive org-svc to open directly through its breaker
        let breaker = state.dispatcher.breakers().get("org-svc");
        for _ in 0..breaker.config().failure_threshold {
            let _ = breaker.call(|| async { Err::<(), _>("down") }).await;
        }

        let Json(overview) = list_breakers(State(state.clone())).await;
        assert!(overview.services["org-svc"].state.is_open());
        assert!(overview.services["org-svc"].opened_at.is_some());
        assert!(overview.services["quiz-svc"].state.is_closed());
    }

    #[tokio::test]
    async fn test_get_breaker_unknown_service_is_404() {
        let state = test_state();

        let result = get_breaker(State(state.clone()), Path("league-svc".to_string())).await;
        assert!(matches!(result, Err(StatusCode::NOT_FOUND)));

        let snapshot = get_breaker(State(state), Path("org-svc".to_string()))
            .await
            .unwrap();
        assert!(snapshot.0.state.is_closed());
    }

    #[tokio::test]
    async fn test_status_query_causes_no_writes() {
        let state = test_state();
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn SharedStore> = store.clone();
        let dispatcher = Arc::new(Dispatcher::new(&state.config, shared));
        let state = AppState {
            table: state.table.clone(),
            dispatcher,
            config: state.config.clone(),
        };

        let _ = list_breakers(State(state)).await;
        assert!(store.is_empty());
    }
}
