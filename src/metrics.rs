//! Per-domain probe history and the shared metrics store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

/// Timestamp triple recording one domain's probe history.
///
/// All three fields are `None` until the corresponding outcome is first
/// observed. `last_request` moves forward on every probe attempt;
/// `last_success` and `last_failure` only on the matching outcome, so a
/// domain's success history survives transient failures and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainMetrics {
    /// Moment of the most recent HTTP 200 response.
    pub last_success: Option<DateTime<Utc>>,
    /// Moment of the most recent probe attempt, success or failure.
    pub last_request: Option<DateTime<Utc>>,
    /// Moment of the most recent non-200 response or transport error.
    pub last_failure: Option<DateTime<Utc>>,
}

/// Thread-safe map from domain to its probe history.
///
/// Shared by every probe worker within and across cycles. Entries are
/// created lazily on first observation and never removed; a domain that
/// disappears from a reloaded topology keeps its last-seen record. The
/// inner lock is held only for the duration of a map operation, never
/// across an await point, so the store is cheap to share via `clone()`.
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    inner: Arc<RwLock<HashMap<String, DomainMetrics>>>,
}

impl MetricsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored record for `domain`, creating a zero-valued one
    /// if absent.
    ///
    /// Concurrent callers racing on the same new key observe exactly one
    /// insertion; no caller ever sees a partially-initialized record.
    pub fn get_or_create(&self, domain: &str) -> DomainMetrics {
        if let Some(metrics) = self.read().get(domain) {
            return *metrics;
        }
        *self.write().entry(domain.to_string()).or_default()
    }

    /// Replace the stored record for `domain`.
    ///
    /// The write is visible to any later `get_or_create` or `snapshot` of
    /// the same key, including from other tasks and later cycles.
    pub fn update(&self, domain: &str, metrics: DomainMetrics) {
        self.write().insert(domain.to_string(), metrics);
    }

    /// Point-in-time copy of every record.
    pub fn snapshot(&self) -> HashMap<String, DomainMetrics> {
        self.read().clone()
    }

    /// Number of domains ever observed.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no domain has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means a probe task panicked mid-operation; the
    // map itself is still a usable snapshot, so recover instead of
    // propagating the panic.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DomainMetrics>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DomainMetrics>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
