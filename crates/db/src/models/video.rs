//! Library video models.

use clipstudio_core::library::LibraryEntry;
use clipstudio_core::types::{DbId, TimestampMillis};
use sqlx::FromRow;

/// A row from the `videos` table. Never mutated after insert.
#[derive(Debug, Clone, FromRow)]
pub struct VideoRecord {
    pub id: DbId,
    pub prompt: String,
    pub video_blob: Vec<u8>,
    pub thumbnail_blob: Vec<u8>,
    pub timestamp_millis: TimestampMillis,
}

impl LibraryEntry for VideoRecord {
    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn timestamp_millis(&self) -> TimestampMillis {
        self.timestamp_millis
    }
}

/// DTO for adding a successfully generated clip to the library.
#[derive(Debug, Clone)]
pub struct CreateVideoRecord {
    pub prompt: String,
    pub video_blob: Vec<u8>,
    pub thumbnail_blob: Vec<u8>,
    pub timestamp_millis: TimestampMillis,
}
