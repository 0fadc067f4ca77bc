//! Per-collection sync lanes and the status they report.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::models::CollectionName;

/// Outcome of one resync task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncReport {
    pub generation: u64,
    pub upserted: u64,
    pub failed: u64,
    /// Records without an id, never sent
    pub skipped: u64,
    pub deleted: u64,
    /// A newer resync for the same collection started before this one finished
    pub superseded: bool,
}

/// Running totals for one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneStats {
    pub upserted: u64,
    pub failed: u64,
    pub skipped: u64,
    pub deleted: u64,
    pub superseded: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Status of one collection as exposed to collaborators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSyncStatus {
    pub collection: CollectionName,
    pub busy: bool,
    pub stats: LaneStats,
}

/// Status of every collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusReport {
    /// True while any collection is busy
    pub syncing: bool,
    pub collections: Vec<CollectionSyncStatus>,
}

/// Replication bookkeeping for one collection.
pub(crate) struct SyncLane {
    generation: AtomicU64,
    in_flight: watch::Sender<usize>,
    /// Removed ids awaiting a confirmed remote delete, with the generation that removed them
    pending_deletes: Mutex<HashMap<String, u64>>,
    stats: Mutex<LaneStats>,
}

impl SyncLane {
    pub fn new() -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            generation: AtomicU64::new(0),
            in_flight,
            pending_deletes: Mutex::new(HashMap::new()),
            stats: Mutex::new(LaneStats::default()),
        }
    }

    /// Claim the next generation, superseding every earlier one.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn begin(&self) {
        self.in_flight.send_modify(|n| *n += 1);
    }

    pub fn finish(&self) {
        self.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn is_busy(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// Queue ids removed by `generation`; ids present again are no longer removed.
    pub fn note_removals<'a>(
        &self,
        generation: u64,
        removed: impl IntoIterator<Item = &'a str>,
        present: impl IntoIterator<Item = &'a str>,
    ) {
        let mut pending = self.pending_deletes.lock();
        for id in present {
            pending.remove(id);
        }
        pending.extend(removed.into_iter().map(|id| (id.to_string(), generation)));
    }

    /// Ids still awaiting deletion, sorted. Entries stay queued until confirmed.
    pub fn pending_deletes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pending_deletes.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop `id` from the queue unless a later generation removed it again.
    pub fn confirm_delete(&self, id: &str, generation: u64) {
        let mut pending = self.pending_deletes.lock();
        if pending.get(id).is_some_and(|removed_by| *removed_by <= generation) {
            pending.remove(id);
        }
    }

    pub fn has_pending_deletes(&self) -> bool {
        !self.pending_deletes.lock().is_empty()
    }

    pub fn record(&self, report: &ResyncReport) {
        let mut stats = self.stats.lock();
        stats.upserted += report.upserted;
        stats.failed += report.failed;
        stats.skipped += report.skipped;
        stats.deleted += report.deleted;
        if report.superseded {
            stats.superseded += 1;
        } else {
            stats.last_completed_at = Some(Utc::now());
        }
    }

    pub fn stats(&self) -> LaneStats {
        self.stats.lock().clone()
    }
}
