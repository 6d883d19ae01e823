use clipstudio_db::DbPool;

/// Fresh in-memory database with all migrations applied.
pub async fn memory_pool() -> DbPool {
    let pool = clipstudio_db::create_pool("sqlite::memory:")
        .await
        .expect("open in-memory database");
    clipstudio_db::run_migrations(&pool)
        .await
        .expect("apply migrations");
    pool
}
