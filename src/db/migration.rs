use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Timestamps are UTC epoch milliseconds
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS api_cache (
            cache_id INTEGER PRIMARY KEY AUTOINCREMENT,
            cache_key_hash TEXT NOT NULL UNIQUE,
            cache_key_raw TEXT,
            payload_json TEXT NOT NULL,
            building_id INTEGER,
            guest_ip TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    // Sweeps filter on both timestamps
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_api_cache_expires_at
         ON api_cache(expires_at)"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_api_cache_created_at
         ON api_cache(created_at)"
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
