//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees. Returns all
//! validation errors, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::uri::Authority;

use crate::config::schema::{BreakerSettings, GatewayConfig};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("listener bind address `{0}` is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("metrics address `{0}` is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("duplicate service name `{0}`")]
    DuplicateServiceName(String),

    #[error("service `{service}` address `{address}` is not a valid host:port")]
    InvalidServiceAddress { service: String, address: String },

    #[error("service `{0}` path prefix must start with `/`")]
    InvalidPathPrefix(String),

    #[error("{scope}: failure_threshold must be at least 1")]
    ZeroFailureThreshold { scope: String },

    #[error("{scope}: success_threshold must be at least 1")]
    ZeroSuccessThreshold { scope: String },

    #[error("{scope}: open_timeout_secs must be greater than zero")]
    ZeroOpenTimeout { scope: String },

    #[error("{scope}: state_ttl_secs must be at least open_timeout_secs, or open circuits expire early")]
    StateTtlTooShort { scope: String },
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    check_breaker("breaker defaults", &config.breaker, &mut errors);

    let mut seen = HashSet::new();
    for service in &config.services {
        if !seen.insert(service.name.clone()) {
            errors.push(ValidationError::DuplicateServiceName(service.name.clone()));
        }

        if service.address.is_empty() || service.address.parse::<Authority>().is_err() {
            errors.push(ValidationError::InvalidServiceAddress {
                service: service.name.clone(),
                address: service.address.clone(),
            });
        }

        if !service.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix(service.name.clone()));
        }

        if let Some(settings) = &service.breaker {
            check_breaker(&format!("service `{}`", service.name), settings, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_breaker(scope: &str, settings: &BreakerSettings, errors: &mut Vec<ValidationError>) {
    if settings.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold {
            scope: scope.to_string(),
        });
    }
    if settings.success_threshold == 0 {
        errors.push(ValidationError::ZeroSuccessThreshold {
            scope: scope.to_string(),
        });
    }
    if settings.open_timeout_secs == 0 {
        errors.push(ValidationError::ZeroOpenTimeout {
            scope: scope.to_string(),
        });
    }
    if settings.state_ttl_secs < settings.open_timeout_secs {
        errors.push(ValidationError::StateTtlTooShort {
            scope: scope.to_string(),
        });
    }
}
