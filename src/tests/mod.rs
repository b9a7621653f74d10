mod cache_tests;

use crate::{config::Config, db::connection};
use sqlx::SqlitePool;

/// Fresh migrated in-memory database
pub(crate) async fn test_pool() -> SqlitePool {
    connection::connect_in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// Defaults with the in-process tier off, so every lookup reaches SQLite.
pub(crate) fn sqlite_only_config() -> Config {
    Config {
        cache_max_capacity: 0,
        ..Config::default()
    }
}
