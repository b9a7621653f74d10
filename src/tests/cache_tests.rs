//! tests/cache_tests.rs - Forecast cache store and sweeper

#[cfg(test)]
mod tests {
    use crate::{
        cache::sweeper,
        db::forecast_cache::{self, CacheStoreError},
        forecast::{project, ProjectionParams, YearRange},
        models::{CacheEntry, ForecastResult},
        tests::test_pool,
    };
    use chrono::{DateTime, TimeDelta, Utc};
    use futures::future::join_all;
    use sqlx::SqlitePool;
    use std::time::Duration;

    fn result_for_area(area: f64) -> ForecastResult {
        project(YearRange::normalize(2025, 2031, 6), Some(area), &ProjectionParams::default())
    }

    fn entry(key_hash: &str, payload: ForecastResult, created_at: DateTime<Utc>, ttl: TimeDelta) -> CacheEntry {
        CacheEntry {
            key_hash: key_hash.to_string(),
            key_raw: format!("raw:{}", key_hash),
            payload,
            building_id: None,
            guest_ip: None,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    async fn row_count(pool: &SqlitePool) -> i64 {
        forecast_cache::count_entries(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_lookup_returns_live_entry() {
        let pool = test_pool().await;
        let now = Utc::now();
        let mut stored = entry("live", result_for_area(1000.0), now, TimeDelta::minutes(30));
        stored.building_id = Some(7);
        stored.guest_ip = Some("10.0.0.1".to_string());
        forecast_cache::upsert(&pool, &stored).await.unwrap();

        let found = forecast_cache::lookup(&pool, "live", now).await.unwrap();
        let found = found.expect("entry should be live");
        assert_eq!(found.payload, stored.payload);
        assert_eq!(found.key_raw, "raw:live");
        assert_eq!(found.building_id, Some(7));
        assert_eq!(found.guest_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(found.expires_at.timestamp_millis(), stored.expires_at.timestamp_millis());

        assert!(forecast_cache::lookup(&pool, "other", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_unswept_row_is_a_miss() {
        let pool = test_pool().await;
        let now = Utc::now();
        let stored = entry("stale", result_for_area(1000.0), now - TimeDelta::minutes(31), TimeDelta::minutes(30));
        forecast_cache::upsert(&pool, &stored).await.unwrap();

        assert!(forecast_cache::lookup(&pool, "stale", now).await.unwrap().is_none());
        // Expiry is exclusive: a row expiring exactly now is already gone.
        assert!(forecast_cache::lookup(&pool, "stale", stored.expires_at).await.unwrap().is_none());
        assert_eq!(row_count(&pool).await, 1, "lookup must not delete");
    }

    #[tokio::test]
    async fn test_upsert_replaces_instead_of_duplicating() {
        let pool = test_pool().await;
        let now = Utc::now();
        let first = entry("same", result_for_area(1000.0), now, TimeDelta::minutes(30));
        let second = entry("same", result_for_area(2500.0), now + TimeDelta::seconds(5), TimeDelta::minutes(30));

        forecast_cache::upsert(&pool, &first).await.unwrap();
        forecast_cache::upsert(&pool, &second).await.unwrap();

        assert_eq!(row_count(&pool).await, 1);
        let found = forecast_cache::lookup(&pool, "same", now).await.unwrap().unwrap();
        assert_eq!(found.payload, second.payload);
        assert_eq!(found.created_at.timestamp_millis(), second.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_row() {
        let pool = test_pool().await;
        let now = Utc::now();

        let writes = (0..16).map(|i| {
            let pool = pool.clone();
            let stored = entry("race", result_for_area(100.0 * (i + 1) as f64), now, TimeDelta::minutes(30));
            tokio::spawn(async move { forecast_cache::upsert(&pool, &stored).await })
        });
        for outcome in join_all(writes).await {
            outcome.unwrap().unwrap();
        }

        assert_eq!(row_count(&pool).await, 1);
        let found = forecast_cache::lookup(&pool, "race", now).await.unwrap();
        assert!(found.is_some(), "the last writer's row should be readable");
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_rows() {
        let pool = test_pool().await;
        let cutoff = Utc::now();

        let expired = CacheEntry {
            expires_at: cutoff - TimeDelta::seconds(1),
            ..entry("expired", result_for_area(1000.0), cutoff - TimeDelta::minutes(30), TimeDelta::zero())
        };
        let fresh = entry("fresh", result_for_area(1000.0), cutoff + TimeDelta::seconds(1), TimeDelta::minutes(30));
        forecast_cache::upsert(&pool, &expired).await.unwrap();
        forecast_cache::upsert(&pool, &fresh).await.unwrap();

        let removed = forecast_cache::sweep_expired(&pool, cutoff).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(row_count(&pool).await, 1);
        assert!(forecast_cache::lookup(&pool, "fresh", cutoff).await.unwrap().is_some());
        assert_eq!(forecast_cache::sweep_expired(&pool, cutoff).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_once_uses_ttl_cutoff() {
        let pool = test_pool().await;
        let now = Utc::now();
        let ttl = TimeDelta::minutes(30);

        forecast_cache::upsert(&pool, &entry("old", result_for_area(10.0), now - TimeDelta::minutes(31), ttl))
            .await
            .unwrap();
        forecast_cache::upsert(&pool, &entry("recent", result_for_area(10.0), now - TimeDelta::minutes(5), ttl))
            .await
            .unwrap();

        let removed = sweeper::sweep_once(&pool, Duration::from_secs(30 * 60), now).await.unwrap();

        assert_eq!(removed, 1);
        assert!(forecast_cache::lookup(&pool, "recent", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let pool = test_pool().await;
        let shutdown = tokio_util::sync::CancellationToken::new();
        let handle = tokio::spawn(sweeper::run(
            pool,
            Duration::from_secs(60),
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should exit after cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported() {
        let pool = test_pool().await;
        let now = Utc::now();
        forecast_cache::upsert(&pool, &entry("bad", result_for_area(1000.0), now, TimeDelta::minutes(30)))
            .await
            .unwrap();
        sqlx::query("UPDATE api_cache SET payload_json = '{\"years\": 3}'")
            .execute(&pool)
            .await
            .unwrap();

        let err = forecast_cache::lookup(&pool, "bad", now).await.unwrap_err();
        assert!(matches!(err, CacheStoreError::Payload(_)));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let pool = test_pool().await;
        let now = Utc::now();
        forecast_cache::upsert(&pool, &entry("gone", result_for_area(1000.0), now, TimeDelta::minutes(30)))
            .await
            .unwrap();

        assert!(forecast_cache::delete(&pool, "gone").await.unwrap());
        assert!(!forecast_cache::delete(&pool, "gone").await.unwrap());
        assert_eq!(row_count(&pool).await, 0);
    }
}
