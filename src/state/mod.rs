//! In-memory authoritative state.
//!
//! Reads always come from here; the remote store is only a mirror. `mutate` installs the
//! next snapshot before any network activity, so a read straight after a mutation sees it
//! regardless of how the resync goes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::models::{Collection, CollectionName, Language, Record, User};
use crate::settings::{SettingsStore, LANGUAGE_KEY};
use crate::sync::{CollectionSyncer, ResyncReport};

/// Snapshot returned by a mutation together with its background resync.
pub struct Mutation {
    pub snapshot: Collection,
    pub resync: JoinHandle<ResyncReport>,
}

/// Holds every collection, the active user and the UI language.
pub struct StateStore {
    collections: RwLock<HashMap<CollectionName, Collection>>,
    current_user: RwLock<Option<User>>,
    language: RwLock<Language>,
    syncer: Arc<CollectionSyncer>,
    settings: Arc<dyn SettingsStore>,
    ready: watch::Sender<bool>,
}

impl StateStore {
    /// Create a store holding `seed` as every collection's default.
    pub fn new(
        seed: HashMap<CollectionName, Vec<Record>>,
        syncer: Arc<CollectionSyncer>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let mut collections: HashMap<CollectionName, Collection> = CollectionName::ALL
            .into_iter()
            .map(|name| (name, Arc::new(Vec::new())))
            .collect();
        for (name, records) in seed {
            collections.insert(name, Arc::new(records));
        }
        let (ready, _) = watch::channel(false);

        Self {
            collections: RwLock::new(collections),
            current_user: RwLock::new(None),
            language: RwLock::new(Language::default()),
            syncer,
            settings,
            ready,
        }
    }

    pub fn syncer(&self) -> &Arc<CollectionSyncer> {
        &self.syncer
    }

    /// Current snapshot of a collection.
    pub fn get(&self, name: CollectionName) -> Collection {
        self.collections
            .read()
            .get(&name)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `updater` to the current snapshot, install the result and start a resync.
    ///
    /// Returns once the new snapshot is installed; the resync runs in the background on
    /// the syncer's runtime, so callers need not be inside one.
    pub fn mutate<F>(&self, name: CollectionName, updater: F) -> Mutation
    where
        F: FnOnce(&[Record]) -> Vec<Record>,
    {
        let mut collections = self.collections.write();
        let previous = collections.get(&name).cloned().unwrap_or_default();
        let snapshot: Collection = Arc::new(updater(&previous));
        collections.insert(name, snapshot.clone());

        // Started under the write lock so generations follow mutation order.
        let resync = self.syncer.resync(name, &previous, snapshot.clone());
        drop(collections);

        Mutation { snapshot, resync }
    }

    /// Replace a collection wholesale.
    pub fn replace(&self, name: CollectionName, records: Vec<Record>) -> Mutation {
        self.mutate(name, move |_| records)
    }

    /// Insert `record`, or replace the record with the same id in place.
    pub fn upsert_record(&self, name: CollectionName, record: Record) -> Mutation {
        self.mutate(name, move |previous| {
            let mut next = previous.to_vec();
            match next
                .iter()
                .position(|existing| existing.id().is_some() && existing.id() == record.id())
            {
                Some(index) => next[index] = record,
                None => next.push(record),
            }
            next
        })
    }

    /// Remove every record with `id`. Returns `None` when nothing matched.
    pub fn remove_record(&self, name: CollectionName, id: &str) -> Option<Mutation> {
        if !self.get(name).iter().any(|r| r.id() == Some(id)) {
            return None;
        }
        Some(self.mutate(name, |previous| {
            previous
                .iter()
                .filter(|r| r.id() != Some(id))
                .cloned()
                .collect()
        }))
    }

    /// Install a boot-time snapshot without resyncing. Empty input keeps the seed.
    ///
    /// Returns whether the snapshot was installed.
    pub fn hydrate(&self, name: CollectionName, records: Vec<Record>) -> bool {
        if records.is_empty() {
            return false;
        }
        self.install(name, records);
        true
    }

    /// Install a snapshot as-is, without resyncing.
    pub(crate) fn install(&self, name: CollectionName, records: Vec<Record>) {
        self.collections.write().insert(name, Arc::new(records));
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub(crate) fn set_current_user(&self, user: Option<User>) {
        *self.current_user.write() = user;
    }

    pub fn language(&self) -> Language {
        self.language.read().clone()
    }

    /// Change the UI language and persist it.
    pub async fn set_language(&self, language: Language) -> Result<(), AppError> {
        *self.language.write() = language.clone();
        self.settings.set(LANGUAGE_KEY, language.as_str()).await
    }

    /// Apply the persisted language at boot without writing it back.
    pub(crate) fn restore_language(&self, language: Language) {
        *self.language.write() = language;
    }

    /// Whether any collection is being mirrored right now.
    pub fn is_syncing(&self) -> bool {
        self.syncer.is_syncing()
    }

    /// Signal that bootstrap finished. Only the first call has an effect.
    pub fn mark_ready(&self) -> bool {
        self.ready.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        })
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use crate::test_support::{records, MockRemote};
    use serde_json::json;

    fn store_with(remote: Arc<MockRemote>) -> (StateStore, Arc<MemorySettings>) {
        let settings = Arc::new(MemorySettings::new());
        let syncer = Arc::new(CollectionSyncer::new(remote, settings.clone()));
        let seed = HashMap::from([(
            CollectionName::Workers,
            records(vec![json!({ "id": "seed-1", "workerId": "W-1" })]),
        )]);
        (StateStore::new(seed, syncer, settings.clone()), settings)
    }

    #[tokio::test]
    async fn test_mutate_is_visible_before_remote_resolves() {
        let remote = Arc::new(MockRemote::hanging());
        let (store, _) = store_with(remote.clone());

        let mutation = store.mutate(CollectionName::Shifts, |previous| {
            let mut next = previous.to_vec();
            next.extend(records(vec![json!({ "id": "s1", "day": "mon" })]));
            next
        });

        let current = store.get(CollectionName::Shifts);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id(), Some("s1"));
        assert!(Arc::ptr_eq(&current, &mutation.snapshot));
        assert!(store.is_syncing());

        tokio::task::yield_now().await;
        assert_eq!(remote.upserted_ids(CollectionName::Shifts), vec!["s1"]);
        assert!(!mutation.resync.is_finished());
        mutation.resync.abort();
        let _ = mutation.resync.await;
        assert!(!store.is_syncing());
    }

    #[tokio::test]
    async fn test_mutate_from_a_plain_thread() {
        let remote = Arc::new(MockRemote::new());
        let (store, _) = store_with(remote.clone());
        let store = Arc::new(store);

        let writer = store.clone();
        let mutation = std::thread::spawn(move || {
            writer.replace(
                CollectionName::Announcements,
                records(vec![json!({ "id": "a1", "title": "Gate B closed" })]),
            )
        })
        .join()
        .unwrap();

        assert_eq!(store.get(CollectionName::Announcements).len(), 1);
        mutation.resync.await.unwrap();
        assert_eq!(remote.upserted_ids(CollectionName::Announcements), vec!["a1"]);
    }

    #[tokio::test]
    async fn test_mutate_sends_only_records_with_id() {
        let remote = Arc::new(MockRemote::new());
        let (store, _) = store_with(remote.clone());

        let mutation = store.replace(
            CollectionName::Posts,
            records(vec![
                json!({ "id": "p1", "text": "Site closed Friday" }),
                json!({ "text": "draft" }),
                json!({ "id": "p2", "text": "Helmets required" }),
            ]),
        );
        mutation.resync.await.unwrap();

        assert_eq!(store.get(CollectionName::Posts).len(), 3);
        assert_eq!(remote.upsert_count(), 2);
    }

    #[tokio::test]
    async fn test_hydrate_is_idempotent() {
        let remote = Arc::new(MockRemote::new());
        let (store, _) = store_with(remote.clone());
        let fetched = records(vec![json!({ "id": "l1" }), json!({ "id": "l2" })]);

        assert!(store.hydrate(CollectionName::Leaves, fetched.clone()));
        let first = store.get(CollectionName::Leaves);
        assert!(store.hydrate(CollectionName::Leaves, fetched));
        let second = store.get(CollectionName::Leaves);

        assert_eq!(*first, *second);
        assert_eq!(second.len(), 2);
        assert_eq!(remote.upsert_count(), 0);
        assert!(!store.is_syncing());
    }

    #[tokio::test]
    async fn test_hydrate_empty_keeps_seed() {
        let (store, _) = store_with(Arc::new(MockRemote::new()));

        assert!(!store.hydrate(CollectionName::Workers, Vec::new()));
        assert_eq!(store.get(CollectionName::Workers)[0].id(), Some("seed-1"));
    }

    #[tokio::test]
    async fn test_upsert_and_remove_record() {
        let remote = Arc::new(MockRemote::new());
        let (store, _) = store_with(remote.clone());

        store
            .upsert_record(
                CollectionName::Workers,
                Record::from_value(json!({ "id": "seed-1", "workerId": "W-9" })).unwrap(),
            )
            .resync
            .await
            .unwrap();
        let workers = store.get(CollectionName::Workers);
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].str_field("workerId"), Some("W-9"));

        assert!(store.remove_record(CollectionName::Workers, "missing").is_none());
        store
            .remove_record(CollectionName::Workers, "seed-1")
            .unwrap()
            .resync
            .await
            .unwrap();
        assert!(store.get(CollectionName::Workers).is_empty());
        assert_eq!(remote.deleted_ids(CollectionName::Workers), vec!["seed-1"]);
    }

    #[tokio::test]
    async fn test_set_language_persists() {
        let (store, settings) = store_with(Arc::new(MockRemote::new()));

        store.set_language(Language::parse("ar").unwrap()).await.unwrap();

        assert_eq!(store.language().as_str(), "ar");
        assert_eq!(settings.get(LANGUAGE_KEY).await.unwrap().as_deref(), Some("ar"));
    }

    #[tokio::test]
    async fn test_ready_fires_once() {
        let (store, _) = store_with(Arc::new(MockRemote::new()));

        assert!(!store.is_ready());
        assert!(store.mark_ready());
        assert!(!store.mark_ready());
        assert!(store.is_ready());
        store.wait_ready().await;
    }
}
