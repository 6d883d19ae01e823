use std::path::Path;

use chrono::DateTime;
use clipstudio_core::error::CoreError;
use clipstudio_core::library::SortOrder;
use clipstudio_core::types::DbId;
use clipstudio_db::models::video::VideoRecord;
use clipstudio_db::repositories::VideoRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Prompts longer than this are cut in the listing.
const PROMPT_COLUMN_CHARS: usize = 60;

pub async fn list(state: &AppState, sort: SortOrder) -> AppResult<()> {
    let records = VideoRepo::list_sorted(&state.pool, sort).await?;
    if records.is_empty() {
        println!("Library is empty");
        return Ok(());
    }

    println!("{:>5}  {:<16}  {:>9}  PROMPT", "ID", "CREATED", "SIZE");
    for record in &records {
        println!("{}", format_row(record));
    }
    Ok(())
}

/// Write a stored clip (and optionally its thumbnail) to disk.
pub async fn export(
    state: &AppState,
    id: DbId,
    path: &Path,
    thumbnail: Option<&Path>,
) -> AppResult<()> {
    let record = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Video", id })?;

    tokio::fs::write(path, &record.video_blob)
        .await
        .map_err(|e| AppError::write_file(path, e))?;
    println!("Exported video #{id} to {}", path.display());

    if let Some(thumb_path) = thumbnail {
        if record.thumbnail_blob.is_empty() {
            return Err(CoreError::Validation(format!("Video #{id} has no thumbnail")).into());
        }
        tokio::fs::write(thumb_path, &record.thumbnail_blob)
            .await
            .map_err(|e| AppError::write_file(thumb_path, e))?;
        println!("Exported thumbnail to {}", thumb_path.display());
    }

    Ok(())
}

fn format_row(record: &VideoRecord) -> String {
    let created = DateTime::from_timestamp_millis(record.timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>5}  {:<16}  {:>9}  {}",
        record.id,
        created,
        format_size(record.video_blob.len()),
        truncate(&record.prompt, PROMPT_COLUMN_CHARS),
    )
}

fn format_size(bytes: usize) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / MIB)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

/// Single-line, char-safe truncation with a trailing ellipsis.
fn truncate(text: &str, max_chars: usize) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= max_chars {
        return line;
    }
    let cut: String = line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
