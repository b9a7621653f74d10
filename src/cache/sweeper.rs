//! Periodic removal of expired forecast rows

use crate::db::forecast_cache;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Delete rows older than `ttl` as of `now`. Returns the number removed.
pub async fn sweep_once(
    pool: &SqlitePool,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    let cutoff = now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC);

    let removed = forecast_cache::sweep_expired(pool, cutoff).await?;
    if removed > 0 {
        info!("api_cache evicted {} rows (cutoff={})", removed, cutoff);
    } else {
        debug!("api_cache sweep found nothing (cutoff={})", cutoff);
    }
    Ok(removed)
}

/// Sweep every `every` until `shutdown` is cancelled. The first sweep runs immediately.
pub async fn run(pool: SqlitePool, ttl: Duration, every: Duration, shutdown: CancellationToken) {
    info!("Starting cache sweeper (every {:?}, ttl {:?})", every, ttl);

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = sweep_once(&pool, ttl, Utc::now()).await {
                    error!("Cache sweep failed: {}", e);
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down cache sweeper");
                break;
            }
        }
    }
}
