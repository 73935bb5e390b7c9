//! Report rendering and the output file sink.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::metrics::DomainMetrics;
use crate::probe::ProbeStatus;

/// Render a timestamp, or the literal `0` when never observed.
fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => "0".to_string(),
    }
}

/// One newline-terminated report line for a domain.
pub fn render_line(domain: &str, status: ProbeStatus, metrics: &DomainMetrics) -> String {
    format!(
        "{}: {} | Last 200: {} | Last Request: {} | Last Fail: {}\n",
        domain,
        status,
        format_timestamp(metrics.last_success),
        format_timestamp(metrics.last_request),
        format_timestamp(metrics.last_failure),
    )
}

/// Overwrite the report file with this cycle's body.
///
/// The body goes to a sibling temp file first and is renamed into place,
/// so a failed write never clobbers the previous report.
///
/// # Errors
/// Returns the I/O error if the file cannot be written; the previous
/// report, if any, is left untouched in that case.
pub async fn write_report(path: impl AsRef<Path>, body: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
