//! Navigation scenario replay.
//!
//! Loads a TOML scenario, builds one router per configured name around a
//! shared navigator and history service, replays every navigation with
//! scripted routes and prints the lifecycle trace.
//!
//! ```text
//! route-lifecycle scenarios/mailbox.toml --output json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use route_lifecycle::config::load_config;
use route_lifecycle::observability::logging::init_logging;
use route_lifecycle::scenario::ScenarioRunner;

#[derive(Parser)]
#[command(name = "route-lifecycle")]
#[command(about = "Replay a navigation scenario and print the route lifecycle trace", long_about = None)]
struct Cli {
    /// Scenario file (TOML).
    scenario: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Overrides `logging.level` from the scenario file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.scenario)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging)?;

    tracing::info!(
        scenario = %cli.scenario.display(),
        routers = config.scenario.routers.len(),
        routes = config.scenario.routes.len(),
        navigations = config.scenario.navigations.len(),
        "Scenario loaded"
    );

    let trace = ScenarioRunner::new(&config).run().await;

    match cli.output {
        OutputFormat::Text => print!("{}", trace.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trace)?),
    }

    tracing::info!(failures = trace.failures, "Replay complete");
    Ok(())
}
