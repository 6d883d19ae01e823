//! Repository for the `settings` key/value table.

use clipstudio_core::types::now_millis;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::setting::Setting;

pub struct SettingsRepo;

impl SettingsRepo {
    /// Fetch a setting row by key.
    pub async fn find(pool: &SqlitePool, key: &str) -> Result<Option<Setting>, StoreError> {
        sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at_millis FROM settings WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::Read)
    }

    /// Fetch only the value of a setting.
    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, StoreError> {
        Ok(Self::find(pool, key).await?.map(|s| s.value))
    }

    /// Insert or replace a setting.
    pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at_millis)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at_millis = excluded.updated_at_millis",
        )
        .bind(key)
        .bind(value)
        .bind(now_millis())
        .execute(pool)
        .await
        .map_err(StoreError::Write)?;
        Ok(())
    }

    /// Remove a setting. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(pool)
            .await
            .map_err(StoreError::Write)?;
        Ok(result.rows_affected() > 0)
    }
}
