/// Errors from the local library store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened or a connection could not be acquired.
    #[error("Library store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// Embedded migrations failed to apply.
    #[error("Failed to apply library migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An insert or its commit failed.
    #[error("Failed to write to library: {0}")]
    Write(#[source] sqlx::Error),

    #[error("Failed to read from library: {0}")]
    Read(#[source] sqlx::Error),
}
