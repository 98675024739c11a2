use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AnalyticsResult, AnalyticsStatus, PublishedAnalytics};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    /// Newest basket revision a run was started for
    requested: u64,
    latest: Option<Arc<PublishedAnalytics>>,
    /// Newest failed revision and its reason
    failure: Option<(u64, String)>,
}

impl Snapshot {
    fn published_revision(&self) -> Option<u64> {
        self.latest.as_ref().map(|p| p.revision)
    }

    fn failed_revision(&self) -> Option<u64> {
        self.failure.as_ref().map(|(rev, _)| *rev)
    }
}

/// Holds the latest analytics result; newer basket revisions always win.
///
/// Runs are never merged. A run that completes after a newer one has been
/// published is dropped.
#[derive(Clone)]
pub struct AnalyticsPublisher {
    tx: Arc<watch::Sender<Snapshot>>,
}

impl Default for AnalyticsPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Mark a run for `revision` as in flight.
    pub fn begin(&self, revision: u64) {
        self.tx.send_if_modified(|snap| {
            if revision > snap.requested {
                snap.requested = revision;
                true
            } else {
                false
            }
        });
    }

    /// Store `result` unless something at least as new is already there.
    /// Returns whether it was kept.
    pub fn publish(&self, revision: u64, run_id: Uuid, result: AnalyticsResult) -> bool {
        let kept = self.tx.send_if_modified(|snap| {
            let newer_published = snap.published_revision().is_some_and(|r| r >= revision);
            let newer_failed = snap.failed_revision().is_some_and(|r| r > revision);
            if newer_published || newer_failed {
                return false;
            }
            snap.latest = Some(Arc::new(PublishedAnalytics {
                revision,
                run_id,
                computed_at: Utc::now(),
                result,
            }));
            snap.requested = snap.requested.max(revision);
            true
        });
        if !kept {
            debug!("Discarding stale analytics run {} for revision {}", run_id, revision);
        }
        kept
    }

    /// Record that the run for `revision` failed.
    pub fn fail(&self, revision: u64, reason: String) {
        self.tx.send_if_modified(|snap| {
            let newer_published = snap.published_revision().is_some_and(|r| r >= revision);
            let newer_failed = snap.failed_revision().is_some_and(|r| r >= revision);
            if newer_published || newer_failed {
                debug!("Ignoring stale failure for revision {}", revision);
                return false;
            }
            snap.failure = Some((revision, reason));
            snap.requested = snap.requested.max(revision);
            true
        });
    }

    pub fn latest(&self) -> Option<Arc<PublishedAnalytics>> {
        self.tx.borrow().latest.clone()
    }

    pub fn status(&self) -> AnalyticsStatus {
        let snap = self.tx.borrow();
        let published = snap.published_revision();
        let failed = snap.failed_revision();
        let settled = published.max(failed);

        if snap.requested > 0 && settled.map_or(true, |r| r < snap.requested) {
            return AnalyticsStatus::Pending {
                revision: snap.requested,
            };
        }

        match (&snap.latest, &snap.failure) {
            (_, Some((rev, reason))) if published.map_or(true, |p| *rev > p) => {
                AnalyticsStatus::Unavailable {
                    revision: *rev,
                    reason: reason.clone(),
                }
            }
            (Some(latest), _) => AnalyticsStatus::Ready(latest.as_ref().clone()),
            _ => AnalyticsStatus::Idle,
        }
    }
}
