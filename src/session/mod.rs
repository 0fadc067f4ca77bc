//! Session persistence and restoration.
//!
//! Two persisted scalars identify the logged-in user across restarts: the identifier
//! (administrator email, or a worker's `workerId`/`id`) and the role. Restoration checks
//! the administrator first, and only for the exact role `"admin"`, before searching the
//! worker collection.

use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Record, Role, User};
use crate::settings::{SettingsStore, SESSION_ID_KEY, SESSION_ROLE_KEY};
use crate::state::StateStore;

/// Who is using the app right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "user", rename_all = "camelCase")]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
}

/// Persists and restores the logged-in identity.
pub struct SessionManager {
    settings: Arc<dyn SettingsStore>,
    store: Arc<StateStore>,
}

impl SessionManager {
    pub fn new(settings: Arc<dyn SettingsStore>, store: Arc<StateStore>) -> Self {
        Self { settings, store }
    }

    pub fn state(&self) -> SessionState {
        match self.store.current_user() {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Anonymous,
        }
    }

    /// Resolve the persisted session against `workers` and the administrator.
    ///
    /// A match becomes the active user. Unreadable settings count as no session.
    pub async fn restore(&self, workers: &[Record], administrator: &User) -> Option<User> {
        let identifier = self.read(SESSION_ID_KEY).await?;
        let role = self.read(SESSION_ROLE_KEY).await?;

        let found = if Role::parse(&role) == Some(Role::Admin)
            && administrator.email.as_deref() == Some(identifier.as_str())
        {
            Some(administrator.clone())
        } else {
            workers
                .iter()
                .find(|w| {
                    w.id() == Some(identifier.as_str())
                        || w.str_field("workerId") == Some(identifier.as_str())
                })
                .map(User::from_record)
        };

        match &found {
            Some(user) => {
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "Session restored");
                self.store.set_current_user(Some(user.clone()));
            }
            None => tracing::info!("Persisted session no longer matches a user"),
        }
        found
    }

    /// Persist `user` as the session and make it active.
    pub async fn login(&self, user: User) -> Result<(), AppError> {
        self.settings
            .set(SESSION_ID_KEY, &user.session_identifier())
            .await?;
        self.settings
            .set(SESSION_ROLE_KEY, user.role.as_str())
            .await?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Logged in");
        self.store.set_current_user(Some(user));
        Ok(())
    }

    /// Clear the persisted session.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.settings.remove(SESSION_ID_KEY).await?;
        self.settings.remove(SESSION_ROLE_KEY).await?;

        self.store.set_current_user(None);
        tracing::info!("Logged out");
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.settings.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }
}
