//! In-memory ordering of library entries.
//!
//! The store has no secondary indexes; callers fetch everything and sort
//! here.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::TimestampMillis;

/// Display order for the library listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// By prompt, case-insensitive; equal prompts newest first.
    Alphabetical,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "alphabetical" | "alpha" | "a-z" => Ok(Self::Alphabetical),
            other => Err(CoreError::Validation(format!(
                "Invalid sort order '{other}'. Must be one of: newest, oldest, alphabetical"
            ))),
        }
    }
}

/// Anything that can be ordered in the library view.
pub trait LibraryEntry {
    fn prompt(&self) -> &str;
    fn timestamp_millis(&self) -> TimestampMillis;
}

/// Sort entries in place. The sort is stable.
pub fn sort_entries<T: LibraryEntry>(entries: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Newest => entries.sort_by(newest_first),
        SortOrder::Oldest => entries.sort_by_key(|e| e.timestamp_millis()),
        SortOrder::Alphabetical => entries.sort_by(|a, b| {
            a.prompt()
                .to_lowercase()
                .cmp(&b.prompt().to_lowercase())
                .then_with(|| newest_first(a, b))
        }),
    }
}

fn newest_first<T: LibraryEntry>(a: &T, b: &T) -> Ordering {
    b.timestamp_millis().cmp(&a.timestamp_millis())
}
