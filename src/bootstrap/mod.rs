//! One-shot startup sequence.
//!
//! 1. Fetch all six collections concurrently.
//! 2. Hydrate each one; an empty result keeps the seed unless the collection is known to
//!    exist remotely, in which case it really is empty now.
//! 3. Restore the persisted language.
//! 4. Restore the session against the hydrated workers.
//! 5. Signal ready.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::models::{CollectionName, Language, Record, User};
use crate::remote::{RemoteOutcome, RemoteStore};
use crate::session::SessionManager;
use crate::settings::{populated_key, SettingsStore, LANGUAGE_KEY};
use crate::state::StateStore;

/// Where a collection's boot snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HydrateSource {
    Remote,
    /// Remote was empty, failed or unconfigured
    Seed,
    /// Remote was empty and the collection is known to have been populated
    Emptied,
}

/// Summary of a completed bootstrap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootReport {
    pub collections: Vec<(CollectionName, HydrateSource)>,
    pub language: Language,
    pub user: Option<User>,
}

impl BootReport {
    pub fn source(&self, name: CollectionName) -> Option<HydrateSource> {
        self.collections
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, source)| *source)
    }
}

/// Loads remote state into the store and restores the session.
pub struct BootstrapLoader {
    remote: Arc<dyn RemoteStore>,
    settings: Arc<dyn SettingsStore>,
    store: Arc<StateStore>,
    session: Arc<SessionManager>,
    administrator: User,
}

impl BootstrapLoader {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        settings: Arc<dyn SettingsStore>,
        store: Arc<StateStore>,
        session: Arc<SessionManager>,
        administrator: User,
    ) -> Self {
        Self {
            remote,
            settings,
            store,
            session,
            administrator,
        }
    }

    /// Run the startup sequence. Consumes the loader; it never runs twice.
    pub async fn run(self) -> BootReport {
        if !self.remote.is_configured() {
            tracing::warn!("No Data API key configured. Running in memory-only mode");
        }

        let mut fetches = JoinSet::new();
        for name in CollectionName::ALL {
            let remote = self.remote.clone();
            fetches.spawn(async move { (name, remote.find_all(name).await) });
        }

        let mut fetched: Vec<(CollectionName, RemoteOutcome<Vec<Record>>)> = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok(result) => fetched.push(result),
                Err(e) => tracing::error!("Collection fetch task failed: {}", e),
            }
        }

        let mut collections = Vec::with_capacity(CollectionName::ALL.len());
        for name in CollectionName::ALL {
            let outcome = fetched
                .iter()
                .position(|(n, _)| *n == name)
                .map(|index| fetched.swap_remove(index).1)
                .unwrap_or(RemoteOutcome::Unconfigured);
            let source = self.hydrate(name, outcome).await;
            collections.push((name, source));
        }

        let language = self.restore_language().await;

        let workers = self.store.get(CollectionName::Workers);
        let user = self.session.restore(&workers, &self.administrator).await;

        if self.store.mark_ready() {
            tracing::info!("State ready");
        }

        BootReport {
            collections,
            language,
            user,
        }
    }

    async fn hydrate(
        &self,
        name: CollectionName,
        outcome: RemoteOutcome<Vec<Record>>,
    ) -> HydrateSource {
        let records = match outcome {
            RemoteOutcome::Done(records) => records,
            RemoteOutcome::Unconfigured => return HydrateSource::Seed,
            RemoteOutcome::Failed(e) => {
                tracing::warn!(collection = %name, "Fetch failed, keeping seed data: {}", e);
                return HydrateSource::Seed;
            }
        };

        let marker = populated_key(name);
        if !records.is_empty() {
            tracing::info!(collection = %name, "Hydrated {} records", records.len());
            self.store.hydrate(name, records);
            if let Err(e) = self.settings.set(&marker, "1").await {
                tracing::warn!(collection = %name, "Failed to persist populated marker: {}", e);
            }
            return HydrateSource::Remote;
        }

        match self.settings.get(&marker).await {
            Ok(Some(_)) => {
                tracing::info!(collection = %name, "Remote collection is empty");
                self.store.install(name, Vec::new());
                HydrateSource::Emptied
            }
            Ok(None) => HydrateSource::Seed,
            Err(e) => {
                tracing::warn!(collection = %name, "Failed to read populated marker: {}", e);
                HydrateSource::Seed
            }
        }
    }

    async fn restore_language(&self) -> Language {
        match self.settings.get(LANGUAGE_KEY).await {
            Ok(Some(tag)) => {
                if let Some(language) = Language::parse(&tag) {
                    self.store.restore_language(language);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read language preference: {}", e),
        }
        self.store.language()
    }
}
