//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the app tables for empty keys and targets
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DispatcherConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app.default_app must not be empty")]
    EmptyDefaultApp,

    #[error("{table} contains an empty key")]
    EmptyKey { table: &'static str },

    #[error("{table}.{key} maps to an empty app name")]
    EmptyTarget { table: &'static str, key: String },

    #[error("app.deny_app_list contains an empty name")]
    EmptyDenyEntry,

    #[error("app.config_ext must be a bare extension, got {0:?}")]
    InvalidExtension(String),

    #[error("app.bind must not be empty when set")]
    EmptyBind,

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Run every semantic check and collect all failures.
pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let app = &config.app;

    if app.default_app.trim().is_empty() {
        errors.push(ValidationError::EmptyDefaultApp);
    }

    for (table, entries) in [("app.domain_bind", &app.domain_bind), ("app.app_map", &app.app_map)] {
        for (key, target) in entries {
            if key.is_empty() {
                errors.push(ValidationError::EmptyKey { table });
            }
            if target.trim().is_empty() {
                errors.push(ValidationError::EmptyTarget {
                    table,
                    key: key.clone(),
                });
            }
        }
    }

    if app.deny_app_list.iter().any(|name| name.is_empty()) {
        errors.push(ValidationError::EmptyDenyEntry);
    }

    let ext = &app.config_ext;
    if ext.is_empty() || ext.contains('.') || ext.contains('/') {
        errors.push(ValidationError::InvalidExtension(ext.clone()));
    }

    if matches!(&app.bind, Some(name) if name.trim().is_empty()) {
        errors.push(ValidationError::EmptyBind);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
