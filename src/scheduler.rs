//! Fixed-interval scheduling of health-check cycles.

use std::path::PathBuf;

use tokio::time::{Interval, MissedTickBehavior};

use crate::config::{self, AgentConfig, ReloadPolicy};
use crate::cycle;
use crate::metrics::MetricsStore;
use crate::probe::{ProbeError, Prober};
use crate::report;

/// Drives repeated health-check cycles at the configured interval.
///
/// Each tick optionally reloads the agent configuration, loads the app
/// topology, runs one cycle, and writes the report. Every per-tick
/// failure is logged and survived; only the initial HTTP client build
/// can fail the run.
pub struct Scheduler {
    config: AgentConfig,
    config_path: PathBuf,
    store: MetricsStore,
}

impl Scheduler {
    /// Create a scheduler from an already validated startup configuration.
    ///
    /// `config_path` is kept so the reload policy can re-read the file on
    /// later ticks.
    pub fn new(config: AgentConfig, config_path: impl Into<PathBuf>, store: MetricsStore) -> Self {
        Self {
            config,
            config_path: config_path.into(),
            store,
        }
    }

    /// Run the scheduler loop. Never returns under normal operation.
    ///
    /// Ticks that fire while a slow cycle is still running are coalesced,
    /// never queued, so two cycles can never overlap.
    ///
    /// # Errors
    /// Returns `ProbeError` only if the initial HTTP client cannot be
    /// built.
    pub async fn run(mut self) -> Result<(), ProbeError> {
        let mut prober = Prober::new(self.config.http_timeout(), self.store.clone())?;
        let mut ticker = new_ticker(&self.config);
        // Consume the immediate first tick so the first cycle fires after
        // one full interval, matching the configured cadence.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if self.config.reload_policy == ReloadPolicy::Always {
                self.reload(&mut prober, &mut ticker).await;
            }
            self.run_once(&prober).await;
        }
    }

    /// Execute a single tick's cycle: load the topology, probe every
    /// domain, write the report.
    ///
    /// A topology load failure skips the cycle entirely (no partial
    /// report); a report write failure drops this cycle's report and
    /// leaves the previous file untouched. Neither is fatal.
    pub async fn run_once(&self, prober: &Prober) {
        let topology = match config::load_topology(&self.config.apps_config_path) {
            Ok(topology) => topology,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.config.apps_config_path,
                    "topology load failed, skipping cycle"
                );
                return;
            }
        };

        let body = cycle::run_cycle(prober, &topology).await;

        match report::write_report(&self.config.output_file_path, &body).await {
            Ok(()) => {
                tracing::debug!(
                    lines = body.lines().count(),
                    path = %self.config.output_file_path,
                    "report written"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %self.config.output_file_path,
                    "report write failed, dropping this cycle's report"
                );
            }
        }
    }

    /// Re-read the agent configuration, rebuilding the HTTP client and
    /// ticker only when their settings actually changed. A failed reload
    /// keeps the previous configuration in effect.
    async fn reload(&mut self, prober: &mut Prober, ticker: &mut Interval) {
        let new_config = match AgentConfig::load(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.config_path.display(),
                    "config reload failed, keeping previous configuration"
                );
                return;
            }
        };

        if new_config.http_client_timeout != self.config.http_client_timeout {
            match Prober::new(new_config.http_timeout(), self.store.clone()) {
                Ok(rebuilt) => *prober = rebuilt,
                Err(e) => {
                    tracing::warn!(error = %e, "client rebuild failed, keeping previous timeout");
                }
            }
        }

        if new_config.health_check_interval != self.config.health_check_interval {
            tracing::info!(
                interval_secs = new_config.health_check_interval,
                "check interval changed"
            );
            *ticker = new_ticker(&new_config);
            ticker.tick().await;
        }

        self.config = new_config;
    }
}

fn new_ticker(config: &AgentConfig) -> Interval {
    let mut ticker = tokio::time::interval(config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
