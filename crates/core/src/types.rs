/// Library primary keys are SQLite `INTEGER PRIMARY KEY` values.
pub type DbId = i64;

/// Milliseconds since the Unix epoch (UTC).
pub type TimestampMillis = i64;

/// Current wall-clock time as [`TimestampMillis`].
pub fn now_millis() -> TimestampMillis {
    chrono::Utc::now().timestamp_millis()
}
