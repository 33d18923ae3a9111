//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Reject unsafe admin defaults
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("security.unsafe_allowed_paths: '{0}' must start with '/'")]
    RelativeAllowedPath(String),

    #[error("admin.api_key must be changed before enabling the admin listener")]
    PlaceholderApiKey,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "http.request_timeout_secs",
        });
    }

    if config.traffic_watch.queue_capacity == 0 {
        errors.push(ValidationError::Zero {
            field: "traffic_watch.queue_capacity",
        });
    }

    for path in &config.security.unsafe_allowed_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativeAllowedPath(path.clone()));
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
