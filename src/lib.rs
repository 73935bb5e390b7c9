//! Healthwatch - Standalone HTTP Health-Check Agent
//!
//! This crate provides the core functionality for the healthwatch
//! monitoring agent. It can be used as a library by other Rust projects,
//! or run as a standalone binary with the `healthwatch` executable.
//!
//! # Architecture
//!
//! - **Metrics Store**: thread-safe per-domain history (last success,
//!   last request, last failure)
//! - **Prober**: single HTTP GET per target with a bounded timeout,
//!   classified strictly as UP (200) or DOWN (anything else)
//! - **Cycle**: one concurrent worker per host, serial probes within a
//!   host, full join before the report is assembled
//! - **Scheduler**: fixed-interval loop with optional per-tick config
//!   reload and a plain-text report written each cycle
//!
//! # Example
//!
//! ```rust,no_run
//! use healthwatch::{AgentConfig, MetricsStore, Scheduler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::load("config.json")?;
//!     let scheduler = Scheduler::new(config, "config.json", MetricsStore::new());
//!     scheduler.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cycle;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod scheduler;

pub use config::{AgentConfig, App, ConfigError, ReloadPolicy, Topology, load_topology};
pub use cycle::run_cycle;
pub use metrics::{DomainMetrics, MetricsStore};
pub use probe::{ProbeError, ProbeStatus, Prober};
pub use report::{render_line, write_report};
pub use scheduler::Scheduler;
