//! Repository for the `videos` table.
//!
//! Only inserts and reads are exposed; library rows are never updated or
//! deleted by the application.

use clipstudio_core::library::{sort_entries, SortOrder};
use clipstudio_core::types::DbId;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::video::{CreateVideoRecord, VideoRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, prompt, video_blob, thumbnail_blob, timestamp_millis";

/// Provides add/list operations for library videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Persist a clip in its own transaction, returning the stored row with
    /// its assigned id once committed.
    pub async fn add(
        pool: &SqlitePool,
        input: &CreateVideoRecord,
    ) -> Result<VideoRecord, StoreError> {
        let mut tx = pool.begin().await.map_err(StoreError::Unavailable)?;

        let query = format!(
            "INSERT INTO videos (prompt, video_blob, thumbnail_blob, timestamp_millis)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, VideoRecord>(&query)
            .bind(&input.prompt)
            .bind(&input.video_blob)
            .bind(&input.thumbnail_blob)
            .bind(input.timestamp_millis)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::Write)?;

        tx.commit().await.map_err(StoreError::Write)?;

        tracing::info!(
            id = record.id,
            video_bytes = record.video_blob.len(),
            thumbnail_bytes = record.thumbnail_blob.len(),
            "Video added to library",
        );
        Ok(record)
    }

    /// Find a video by its id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<VideoRecord>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = ?1");
        sqlx::query_as::<_, VideoRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::Read)
    }

    /// List every video in primary-key (insertion) order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<VideoRecord>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY id");
        sqlx::query_as::<_, VideoRecord>(&query)
            .fetch_all(pool)
            .await
            .map_err(StoreError::Read)
    }

    /// List every video, sorted in memory by `order`.
    pub async fn list_sorted(
        pool: &SqlitePool,
        order: SortOrder,
    ) -> Result<Vec<VideoRecord>, StoreError> {
        let mut records = Self::list(pool).await?;
        sort_entries(&mut records, order);
        Ok(records)
    }
}
