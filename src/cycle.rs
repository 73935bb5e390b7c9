//! One health-check cycle: fan-out per host, join, concatenate.

use crate::config::Topology;
use crate::probe::Prober;
use crate::report::render_line;

/// Run one complete cycle over `topology` and return the report body.
///
/// One task per host; each task probes its host's apps serially in
/// configuration order, so a host contributes a contiguous, internally
/// ordered block of lines while the number of simultaneous outbound
/// connections stays bounded by the number of hosts. Each task
/// accumulates its lines locally; nothing is shared between workers
/// except the metrics store inside the prober.
///
/// Every task is joined before returning, so the body always reflects a
/// fully completed pass. Cross-host block order follows task completion
/// and is not deterministic.
pub async fn run_cycle(prober: &Prober, topology: &Topology) -> String {
    let mut workers = Vec::with_capacity(topology.len());

    for (host, apps) in topology {
        let prober = prober.clone();
        let host = host.clone();
        let apps = apps.clone();

        workers.push(tokio::spawn(async move {
            let mut lines = String::new();
            for app in &apps {
                let (status, metrics) = prober.probe(&host, app).await;
                lines.push_str(&render_line(&app.domain, status, &metrics));
            }
            lines
        }));
    }

    let mut body = String::new();
    for worker in workers {
        match worker.await {
            Ok(lines) => body.push_str(&lines),
            // One host's failure never aborts the cycle or the other hosts.
            Err(e) => tracing::error!(error = %e, "probe worker panicked"),
        }
    }
    body
}
