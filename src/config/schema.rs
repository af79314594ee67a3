//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::lifecycle::Phase;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Log level and output format.
    pub logging: LoggingConfig,

    /// Policy applied to every scenario route.
    pub lifecycle: LifecycleConfig,

    /// Routers, routes and the navigations to replay.
    pub scenario: ScenarioConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate's targets (`RUST_LOG` takes precedence).
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

/// Lifecycle policy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Upper bound for each fetch/render/destroy call. None = unbounded.
    pub phase_timeout_ms: Option<u64>,

    /// Drop in-flight fetch/render work as soon as a route is cancelled.
    pub abort_on_cancel: bool,
}

/// A replayable navigation scenario.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Router names; each gets its own Router sharing one Navigator.
    pub routers: Vec<String>,

    /// Scripted route definitions.
    pub routes: Vec<RouteConfig>,

    /// Navigations, replayed in order.
    pub navigations: Vec<NavigationConfig>,
}

/// A scripted route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier used by navigations and in the trace.
    pub name: String,

    /// Simulated fetch latency.
    #[serde(default)]
    pub fetch_ms: u64,

    /// Simulated render latency.
    #[serde(default)]
    pub render_ms: u64,

    /// Simulated destroy latency.
    #[serde(default)]
    pub destroy_ms: u64,

    /// Phase that fails, if any.
    #[serde(default)]
    pub fail: Option<Phase>,
}

/// One navigation event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavigationConfig {
    /// Router that handles the navigation.
    pub router: String,

    /// Route to produce. None = plain controller action.
    #[serde(default)]
    pub route: Option<String>,

    /// Positional arguments passed to the callback and the route.
    #[serde(default)]
    pub args: Vec<String>,

    /// Start without waiting for earlier navigations to settle.
    #[serde(default)]
    pub concurrent: bool,
}
