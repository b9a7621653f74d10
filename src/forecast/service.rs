//! Cache-or-compute entry point for forecasts

use super::context::{ForecastContext, ForecastQuery};
use super::projection::{project, ProjectionParams};
use super::scoring::{ScoringRules, Verdict};
use crate::cache::{self, CacheKey, ForecastMemoryCache};
use crate::config::Config;
use crate::db::forecast_cache;
use crate::models::{CacheEntry, ForecastResult};
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ForecastService {
    pool: SqlitePool,
    memory: Option<ForecastMemoryCache>,
    params: ProjectionParams,
    rules: ScoringRules,
    ttl: TimeDelta,
    horizon_years: i32,
}

impl ForecastService {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            memory: cache::init_memory_cache(config),
            params: config.projection.clone(),
            rules: config.scoring.clone(),
            ttl: TimeDelta::from_std(config.cache_ttl).unwrap_or(TimeDelta::MAX),
            horizon_years: config.range_horizon_years,
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// Return the cached forecast for `query`, computing and storing it on a miss.
    ///
    /// Never fails: cache read errors fall through to computation and write
    /// errors are logged. `guest_ip` is stored with the row but is not part of the key.
    pub async fn compute_or_fetch(&self, query: ForecastQuery, guest_ip: Option<String>) -> ForecastResult {
        self.compute_or_fetch_at(query, guest_ip, Utc::now()).await
    }

    pub async fn compute_or_fetch_at(
        &self,
        query: ForecastQuery,
        guest_ip: Option<String>,
        now: DateTime<Utc>,
    ) -> ForecastResult {
        let ctx = ForecastContext::from_query(query, now.year(), self.horizon_years);
        let key = CacheKey::for_context(&ctx);

        if let Some(memory) = &self.memory {
            if let Some(result) = memory.get(key.hash(), now).await {
                info!("[forecast] cache HIT (memory) hash = {}", key.hash());
                self.log_verdict(&result, &ctx, now);
                return result;
            }
        }

        match forecast_cache::lookup(&self.pool, key.hash(), now).await {
            Ok(Some(entry)) => {
                info!("[forecast] cache HIT hash = {}", key.hash());
                self.log_verdict(&entry.payload, &ctx, now);
                return entry.payload;
            }
            Ok(None) => info!("[forecast] cache MISS hash = {}, computing...", key.hash()),
            Err(e) => warn!("[forecast] cache read failed hash = {}; recomputing: {}", key.hash(), e),
        }

        let result = project(ctx.range, ctx.floor_area_m2, &self.params);
        debug!(
            "[forecast] ctx pnu={}, use={}, area(m2)={:?}, baselineKwh={}, unitPrice={}, capex={}",
            ctx.pnu.as_deref().unwrap_or("na"),
            ctx.usage.as_deref().unwrap_or("na"),
            ctx.floor_area_m2,
            self.params.baseline_kwh(ctx.floor_area_m2),
            self.params.unit_price,
            self.params.capex(ctx.floor_area_m2),
        );
        self.log_verdict(&result, &ctx, now);

        self.store(&key, &ctx, &result, guest_ip, now).await;
        result
    }

    /// Score a result with the shared rules.
    pub fn verdict(&self, result: &ForecastResult, built_year: Option<i32>, current_year: i32) -> Verdict {
        self.rules.score(
            f64::from(result.kpi.saving_pct),
            result.kpi.payback_years,
            built_year,
            current_year,
        )
    }

    /// Drop both tiers for `key_hash`. Returns whether a stored row existed.
    pub async fn invalidate(&self, key_hash: &str) -> Result<bool, sqlx::Error> {
        if let Some(memory) = &self.memory {
            memory.invalidate(key_hash).await;
        }
        let removed = forecast_cache::delete(&self.pool, key_hash).await?;
        info!("[forecast] invalidated hash = {} (row removed: {})", key_hash, removed);
        Ok(removed)
    }

    async fn store(
        &self,
        key: &CacheKey,
        ctx: &ForecastContext,
        result: &ForecastResult,
        guest_ip: Option<String>,
        now: DateTime<Utc>,
    ) {
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CacheEntry {
            key_hash: key.hash().to_string(),
            key_raw: key.raw().to_string(),
            payload: result.clone(),
            building_id: ctx.building_id,
            guest_ip,
            created_at: now,
            expires_at,
        };

        if let Err(e) = forecast_cache::upsert(&self.pool, &entry).await {
            warn!("[forecast] api_cache upsert failed hash = {}: {}", key.hash(), e);
        }

        if let Some(memory) = &self.memory {
            memory.insert(key.hash(), result.clone(), expires_at).await;
        }
    }

    // Labels are not part of the payload; recomputed here for the logs only.
    fn log_verdict(&self, result: &ForecastResult, ctx: &ForecastContext, now: DateTime<Utc>) {
        let verdict = self.verdict(result, ctx.built_year, now.year());
        info!(
            "[forecast] score = {}, label = {}, builtYear = {}, savingPct = {}%, payback = {:.2}y",
            verdict.score,
            verdict.label,
            ctx.built_year.map_or_else(|| "na".to_string(), |y| y.to_string()),
            result.kpi.saving_pct,
            result.kpi.payback_years,
        );
    }
}
