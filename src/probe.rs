//! HTTP probe execution and UP/DOWN classification.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::App;
use crate::metrics::{DomainMetrics, MetricsStore};

/// Errors that can occur while setting up the prober.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Outcome label for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The endpoint answered with HTTP 200.
    Up,
    /// The endpoint answered with any other status, or the request failed.
    Down,
}

impl ProbeStatus {
    /// Report label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues health-check requests and records their outcome in the store.
///
/// Cheap to clone: both the HTTP client and the store are handle types,
/// so every probe worker shares one connection pool and one history map.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    store: MetricsStore,
}

impl Prober {
    /// Build a prober with a bounded per-request timeout.
    ///
    /// # Errors
    /// Returns `ProbeError::Client` if the HTTP client cannot be built.
    pub fn new(timeout: Duration, store: MetricsStore) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, store })
    }

    /// Probe one app on `host` and record the outcome.
    ///
    /// A single GET, no retries; a failed probe is simply DOWN for this
    /// cycle and re-attempted at the next tick. Success is exactly HTTP
    /// 200. `last_request` is stamped on every attempt regardless of
    /// outcome; only the matching one of `last_success`/`last_failure`
    /// moves.
    pub async fn probe(&self, host: &str, app: &App) -> (ProbeStatus, DomainMetrics) {
        let url = probe_url(host, &app.health_endpoint);
        let now = Utc::now();
        let result = self.client.get(&url).send().await;

        let mut metrics = self.store.get_or_create(&app.domain);
        metrics.last_request = Some(now);

        // The body is never read; dropping the response at the end of each
        // arm releases the connection on every path.
        let status = match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!(domain = %app.domain, %url, "probe succeeded");
                metrics.last_success = Some(now);
                ProbeStatus::Up
            }
            Ok(response) => {
                tracing::warn!(
                    domain = %app.domain,
                    %url,
                    status = response.status().as_u16(),
                    "probe returned non-200"
                );
                metrics.last_failure = Some(now);
                ProbeStatus::Down
            }
            Err(e) => {
                tracing::warn!(domain = %app.domain, %url, error = %e, "probe failed");
                metrics.last_failure = Some(now);
                ProbeStatus::Down
            }
        };

        self.store.update(&app.domain, metrics);
        (status, metrics)
    }
}

/// Join host and endpoint into a probe URL, avoiding a doubled separator.
fn probe_url(host: &str, endpoint: &str) -> String {
    format!("http://{}/{}", host, endpoint.trim_start_matches('/'))
}
