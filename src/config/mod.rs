//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! scenario file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → logging setup, lifecycle policy, scenario replay
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks
//! - Every validation error is reported, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, LifecycleConfig, LogFormat, LoggingConfig, NavigationConfig, RouteConfig,
    ScenarioConfig,
};
pub use validation::{validate_config, ValidationError};
