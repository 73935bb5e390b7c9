//! Healthwatch binary entry point.
//!
//! This binary runs the health-check agent. Core functionality is
//! provided by the `healthwatch` library crate.

use clap::Parser;
use healthwatch::{AgentConfig, MetricsStore, Scheduler, config::DEFAULT_CONFIG_PATH};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Healthwatch - standalone HTTP health-check agent
#[derive(Parser, Debug)]
#[command(name = "healthwatch", version, about, long_about = None)]
struct Cli {
    /// Path to the agent configuration file
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_PATH,
        env = "HEALTHWATCH_CONFIG"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,healthwatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // A missing or malformed configuration at startup is fatal; every
    // later reload failure is survived with the previous configuration.
    tracing::info!("Loading configuration from: {}", cli.config);
    let config = AgentConfig::load(&cli.config)?;

    tracing::info!(
        interval_secs = config.health_check_interval,
        timeout_secs = config.http_client_timeout,
        topology = %config.apps_config_path,
        report = %config.output_file_path,
        reload_policy = ?config.reload_policy,
        "Healthwatch agent starting"
    );

    let store = MetricsStore::new();
    let scheduler = Scheduler::new(config, cli.config, store);

    tokio::select! {
        result = scheduler.run() => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
