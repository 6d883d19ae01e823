use clipstudio_core::types::TimestampMillis;
use sqlx::FromRow;

/// Settings key holding the user-entered API key.
pub const API_KEY_SETTING: &str = "api_key";

/// A row from the `settings` table.
#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at_millis: TimestampMillis,
}
