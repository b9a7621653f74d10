// Persistent forecast cache (`api_cache` table):
// - lookup(key_hash, now) -> live entry or None
// - upsert(entry) -> atomic insert-or-replace on cache_key_hash
// - sweep_expired(cutoff) -> rows removed
// - delete(key_hash) -> manual invalidation

use crate::models::{CacheEntry, ForecastResult};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored payload is not a forecast result: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Stored timestamp out of range: {0}")]
    Timestamp(i64),
}

/// Fetch the entry for `key_hash` only if it has not expired at `now`.
pub async fn lookup(
    pool: &Pool<Sqlite>,
    key_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<CacheEntry>, CacheStoreError> {
    let row = sqlx::query(
        r#"SELECT cache_key_hash, cache_key_raw, payload_json, building_id,
                  guest_ip, created_at, expires_at
           FROM api_cache
           WHERE cache_key_hash = ? AND expires_at > ?"#
    )
    .bind(key_hash)
    .bind(now.timestamp_millis())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let payload_json: String = row.try_get("payload_json")?;
    let payload: ForecastResult = serde_json::from_str(&payload_json)?;

    Ok(Some(CacheEntry {
        key_hash: row.try_get("cache_key_hash")?,
        key_raw: row.try_get::<Option<String>, _>("cache_key_raw")?.unwrap_or_default(),
        payload,
        building_id: row.try_get("building_id")?,
        guest_ip: row.try_get("guest_ip")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        expires_at: from_millis(row.try_get("expires_at")?)?,
    }))
}

/// Insert or replace the row for `entry.key_hash` in one statement.
///
/// Concurrent writers of the same key leave exactly one row; the last one wins.
pub async fn upsert(pool: &Pool<Sqlite>, entry: &CacheEntry) -> Result<(), CacheStoreError> {
    let payload_json = serde_json::to_string(&entry.payload)?;

    sqlx::query(
        r#"
        INSERT INTO api_cache
        (cache_key_hash, cache_key_raw, payload_json, building_id, guest_ip, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(cache_key_hash) DO UPDATE SET
            cache_key_raw = excluded.cache_key_raw,
            payload_json  = excluded.payload_json,
            building_id   = excluded.building_id,
            guest_ip      = excluded.guest_ip,
            created_at    = excluded.created_at,
            expires_at    = excluded.expires_at
        "#
    )
    .bind(&entry.key_hash)
    .bind(&entry.key_raw)
    .bind(payload_json)
    .bind(entry.building_id)
    .bind(&entry.guest_ip)
    .bind(entry.created_at.timestamp_millis())
    .bind(entry.expires_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete every row created or expiring at or before `cutoff` in a single statement.
pub async fn sweep_expired(pool: &Pool<Sqlite>, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let cutoff = cutoff.timestamp_millis();

    let result = sqlx::query("DELETE FROM api_cache WHERE expires_at <= ? OR created_at <= ?")
        .bind(cutoff)
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete(pool: &Pool<Sqlite>, key_hash: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM api_cache WHERE cache_key_hash = ?")
        .bind(key_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_entries(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    let count = sqlx::query("SELECT COUNT(*) FROM api_cache")
        .fetch_one(pool)
        .await?
        .get::<i64, _>(0);

    Ok(count)
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, CacheStoreError> {
    DateTime::from_timestamp_millis(millis).ok_or(CacheStoreError::Timestamp(millis))
}
