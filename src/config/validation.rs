//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (navigations reference existing
//!   routers and routes)
//! - Validate value ranges (timeouts > 0, known log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("lifecycle.phase_timeout_ms must be greater than zero")]
    ZeroPhaseTimeout,

    #[error("router name must not be empty")]
    EmptyRouterName,

    #[error("duplicate router `{0}`")]
    DuplicateRouter(String),

    #[error("route name must not be empty")]
    EmptyRouteName,

    #[error("duplicate route `{0}`")]
    DuplicateRoute(String),

    #[error("navigation {index} names unknown router `{router}`")]
    UnknownRouter { index: usize, router: String },

    #[error("navigation {index} names unknown route `{route}`")]
    UnknownRoute { index: usize, route: String },
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if config.lifecycle.phase_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroPhaseTimeout);
    }

    let scenario = &config.scenario;
    let mut routers = HashSet::new();
    for name in &scenario.routers {
        if name.is_empty() {
            errors.push(ValidationError::EmptyRouterName);
        } else if !routers.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateRouter(name.clone()));
        }
    }

    let mut routes = HashSet::new();
    for route in &scenario.routes {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyRouteName);
        } else if !routes.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
    }

    for (index, navigation) in scenario.navigations.iter().enumerate() {
        if !routers.contains(navigation.router.as_str()) {
            errors.push(ValidationError::UnknownRouter {
                index,
                router: navigation.router.clone(),
            });
        }
        if let Some(route) = &navigation.route {
            if !routes.contains(route.as_str()) {
                errors.push(ValidationError::UnknownRoute {
                    index,
                    route: route.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
