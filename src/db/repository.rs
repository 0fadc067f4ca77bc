//! SQLite-backed implementation of the settings port.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::settings::SettingsStore;

/// Settings repository over the `local_settings` table.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM local_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO local_settings (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::settings::{LANGUAGE_KEY, SESSION_ID_KEY};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_settings_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("settings.sqlite");

        {
            let repo = SettingsRepository::new(init_database(&db_path).await.unwrap());
            repo.set(SESSION_ID_KEY, "W-42").await.unwrap();
            repo.set(LANGUAGE_KEY, "en").await.unwrap();
            repo.set(LANGUAGE_KEY, "ar").await.unwrap();
        }

        let repo = SettingsRepository::new(init_database(&db_path).await.unwrap());
        assert_eq!(repo.get(SESSION_ID_KEY).await.unwrap().as_deref(), Some("W-42"));
        assert_eq!(repo.get(LANGUAGE_KEY).await.unwrap().as_deref(), Some("ar"));
    }

    #[tokio::test]
    async fn test_remove_clears_key() {
        let temp_dir = TempDir::new().unwrap();
        let repo =
            SettingsRepository::new(init_database(&temp_dir.path().join("s.sqlite")).await.unwrap());

        repo.set(SESSION_ID_KEY, "u1").await.unwrap();
        repo.remove(SESSION_ID_KEY).await.unwrap();
        repo.remove("never-set").await.unwrap();

        assert_eq!(repo.get(SESSION_ID_KEY).await.unwrap(), None);
    }
}
