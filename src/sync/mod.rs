//! Collection replication policy.
//!
//! A local mutation hands its full snapshot to [`CollectionSyncer::resync`], which marks
//! the collection busy and spawns one task that upserts the snapshot sequentially, then
//! deletes ids that were removed locally. The mutation never waits for it.
//!
//! Each resync takes a per-collection generation. A task checks its generation before
//! every request and stops once a newer resync for the same collection has started, so a
//! stale snapshot cannot keep overwriting a newer one. A request already in flight is
//! not cancelled. Removed ids stay queued until a delete for them is confirmed, so the
//! newest task always sees removals an older one did not finish.

mod status;

pub use status::{CollectionSyncStatus, LaneStats, ResyncReport, SyncStatusReport};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::{Collection, CollectionName};
use crate::remote::{RemoteOutcome, RemoteStore};
use crate::settings::{populated_key, SettingsStore};
use status::SyncLane;

/// Replicates collection snapshots to the remote store.
pub struct CollectionSyncer {
    remote: Arc<dyn RemoteStore>,
    settings: Arc<dyn SettingsStore>,
    lanes: HashMap<CollectionName, Arc<SyncLane>>,
    /// In-flight resyncs across every collection
    busy: Arc<watch::Sender<usize>>,
    runtime: Handle,
}

/// Busy marks held by one resync task, released when the task ends, aborts or panics.
struct InFlight {
    lane: Arc<SyncLane>,
    busy: Arc<watch::Sender<usize>>,
}

impl InFlight {
    fn start(lane: Arc<SyncLane>, busy: Arc<watch::Sender<usize>>) -> Self {
        lane.begin();
        busy.send_modify(|n| *n += 1);
        Self { lane, busy }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.lane.finish();
        self.busy.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl CollectionSyncer {
    /// Must be called inside a Tokio runtime. Resyncs are spawned onto that runtime, so
    /// mutations may come from any thread afterwards.
    pub fn new(remote: Arc<dyn RemoteStore>, settings: Arc<dyn SettingsStore>) -> Self {
        let lanes = CollectionName::ALL
            .into_iter()
            .map(|name| (name, Arc::new(SyncLane::new())))
            .collect();
        let (busy, _) = watch::channel(0);

        Self {
            remote,
            settings,
            lanes,
            busy: Arc::new(busy),
            runtime: Handle::current(),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    fn lane(&self, collection: CollectionName) -> Arc<SyncLane> {
        match self.lanes.get(&collection) {
            Some(lane) => lane.clone(),
            // Every name gets a lane in `new`.
            None => Arc::new(SyncLane::new()),
        }
    }

    /// Replicate `snapshot` in the background.
    ///
    /// The collection is busy from this call until the returned task ends, including
    /// when it is aborted.
    pub fn resync(
        &self,
        collection: CollectionName,
        previous: &Collection,
        snapshot: Collection,
    ) -> JoinHandle<ResyncReport> {
        let lane = self.lane(collection);
        let generation = lane.next_generation();

        let present: HashSet<&str> = snapshot.iter().filter_map(|r| r.id()).collect();
        let removed: Vec<&str> = previous
            .iter()
            .filter_map(|r| r.id())
            .filter(|id| !present.contains(id))
            .collect();
        lane.note_removals(generation, removed, present.iter().copied());

        let in_flight = InFlight::start(lane, self.busy.clone());
        let remote = self.remote.clone();
        let settings = self.settings.clone();

        tracing::debug!(
            collection = %collection,
            generation,
            records = snapshot.len(),
            "Resync started"
        );

        self.runtime.spawn(async move {
            let lane = in_flight.lane.clone();
            let report = run_resync(remote.as_ref(), &lane, collection, generation, &snapshot).await;

            if report.superseded {
                tracing::debug!(collection = %collection, generation, "Resync superseded");
            } else if report.failed > 0 {
                tracing::warn!(
                    collection = %collection,
                    "Resync finished with {} failed of {} records",
                    report.failed,
                    report.failed + report.upserted
                );
            } else if remote.is_configured() && !lane.has_pending_deletes() {
                if let Err(e) = settings.set(&populated_key(collection), "1").await {
                    tracing::warn!(collection = %collection, "Failed to persist populated marker: {}", e);
                }
            }

            lane.record(&report);
            drop(in_flight);
            report
        })
    }

    /// Whether a resync for `collection` is in flight.
    pub fn is_busy(&self, collection: CollectionName) -> bool {
        self.lanes
            .get(&collection)
            .is_some_and(|lane| lane.is_busy())
    }

    /// Whether any resync is in flight.
    pub fn is_syncing(&self) -> bool {
        *self.busy.borrow() > 0
    }

    /// Resolve once no resync for `collection` is in flight.
    pub async fn wait_idle(&self, collection: CollectionName) {
        let mut rx = self.lane(collection).subscribe();
        // The sender lives as long as the lane we hold, so this cannot fail.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Resolve once no resync is in flight anywhere.
    pub async fn wait_all_idle(&self) {
        let mut rx = self.busy.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    pub fn status(&self) -> SyncStatusReport {
        let collections = CollectionName::ALL
            .into_iter()
            .map(|name| {
                let lane = self.lane(name);
                CollectionSyncStatus {
                    collection: name,
                    busy: lane.is_busy(),
                    stats: lane.stats(),
                }
            })
            .collect();

        SyncStatusReport {
            syncing: self.is_syncing(),
            collections,
        }
    }
}

async fn run_resync(
    remote: &dyn RemoteStore,
    lane: &SyncLane,
    collection: CollectionName,
    generation: u64,
    snapshot: &Collection,
) -> ResyncReport {
    let mut report = ResyncReport {
        generation,
        ..ResyncReport::default()
    };

    for record in snapshot.iter() {
        let Some(id) = record.id() else {
            report.skipped += 1;
            continue;
        };
        if !lane.is_current(generation) {
            report.superseded = true;
            return report;
        }

        match remote.upsert_one(collection, id, record).await {
            RemoteOutcome::Done(_) => report.upserted += 1,
            RemoteOutcome::Failed(e) => {
                report.failed += 1;
                tracing::warn!(collection = %collection, id, "Upsert failed, continuing: {}", e);
            }
            RemoteOutcome::Unconfigured => {}
        }
    }

    let present: HashSet<&str> = snapshot.iter().filter_map(|r| r.id()).collect();
    for id in lane.pending_deletes() {
        if present.contains(id.as_str()) {
            continue;
        }
        if !lane.is_current(generation) {
            report.superseded = true;
            return report;
        }

        match remote.delete_one(collection, &id).await {
            RemoteOutcome::Done(_) => {
                report.deleted += 1;
                lane.confirm_delete(&id, generation);
            }
            RemoteOutcome::Failed(e) => {
                report.failed += 1;
                tracing::warn!(collection = %collection, id = %id, "Delete failed, kept for retry: {}", e);
            }
            RemoteOutcome::Unconfigured => lane.confirm_delete(&id, generation),
        }
    }

    report
}
