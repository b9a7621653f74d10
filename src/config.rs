// Runtime configuration for the forecast service:
// - Database connection string
// - Server listening address/port
// - Cache TTL, sweep interval and in-process capacity
// - Projection constants and scoring thresholds

use crate::forecast::projection::ProjectionParams;
use crate::forecast::range::DEFAULT_HORIZON_YEARS;
use crate::forecast::scoring::ScoringRules;
use dotenv::dotenv;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Longest accepted cache TTL: one year.
pub const MAX_CACHE_TTL_MINUTES: u64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cache_ttl: Duration,
    pub sweep_interval: Duration,
    pub cache_max_capacity: u64,
    pub range_horizon_years: i32,
    pub projection: ProjectionParams,
    pub scoring: ScoringRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:forecast.db".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            cache_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(600),
            cache_max_capacity: 1000,
            range_horizon_years: DEFAULT_HORIZON_YEARS,
            projection: ProjectionParams::default(),
            scoring: ScoringRules::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = env_or("SERVER_PORT", defaults.server_port);
        let cache_ttl = env::var("CACHE_TTL_MINUTES")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|mins| ttl_from_minutes(mins, defaults.cache_ttl))
            .unwrap_or(defaults.cache_ttl);
        let sweep_interval = env::var("CACHE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);
        let cache_max_capacity = env_or("CACHE_MAX_CAPACITY", defaults.cache_max_capacity);
        let range_horizon_years =
            env_or("FORECAST_RANGE_HORIZON_YEARS", defaults.range_horizon_years).max(0);

        Self {
            database_url,
            server_host,
            server_port,
            cache_ttl,
            sweep_interval,
            cache_max_capacity,
            range_horizon_years,
            projection: projection_from_env(defaults.projection),
            scoring: scoring_from_env(defaults.scoring),
        }
    }
}

fn projection_from_env(d: ProjectionParams) -> ProjectionParams {
    ProjectionParams {
        eui_kwh_per_m2: non_negative_or("FORECAST_EUI_KWH_PER_M2", d.eui_kwh_per_m2),
        after_rate: rate_or("FORECAST_AFTER_RATE", d.after_rate),
        saving_rate: rate_or("FORECAST_SAVING_RATE", d.saving_rate),
        unit_price: non_negative_or("FORECAST_UNIT_PRICE", d.unit_price),
        capex_fixed: non_negative_or("FORECAST_CAPEX_FIXED", d.capex_fixed),
        capex_per_m2: non_negative_or("FORECAST_CAPEX_PER_M2", d.capex_per_m2),
        fallback_baseline_kwh: non_negative_or("FORECAST_FALLBACK_BASELINE_KWH", d.fallback_baseline_kwh),
    }
}

fn scoring_from_env(d: ScoringRules) -> ScoringRules {
    ScoringRules {
        min_saving_pct: env_or("SCORING_MIN_SAVING_PCT", d.min_saving_pct),
        max_payback_years: env_or("SCORING_MAX_PAYBACK_YEARS", d.max_payback_years),
        saving_pct_high: env_or("SCORING_SAVING_PCT_HIGH", d.saving_pct_high),
        saving_pct_mid: env_or("SCORING_SAVING_PCT_MID", d.saving_pct_mid),
        payback_fast: env_or("SCORING_PAYBACK_FAST", d.payback_fast),
        payback_moderate: env_or("SCORING_PAYBACK_MODERATE", d.payback_moderate),
        age_old: env_or("SCORING_AGE_OLD", d.age_old),
        age_mid: env_or("SCORING_AGE_MID", d.age_mid),
        recommend_min_score: env_or("SCORING_RECOMMEND_MIN", d.recommend_min_score),
        conditional_min_score: env_or("SCORING_CONDITIONAL_MIN", d.conditional_min_score),
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Zero or more than `MAX_CACHE_TTL_MINUTES` keeps the default.
fn ttl_from_minutes(mins: u64, default: Duration) -> Duration {
    if mins == 0 || mins > MAX_CACHE_TTL_MINUTES {
        warn!(
            "CACHE_TTL_MINUTES = {} is outside 1..={}; keeping default {:?}",
            mins, MAX_CACHE_TTL_MINUTES, default
        );
        return default;
    }
    Duration::from_secs(mins * 60)
}

/// Decay rates must stay in [0, 1) or the series would grow or flip sign.
fn rate_or(key: &str, default: f64) -> f64 {
    checked_rate(key, env_or(key, default), default)
}

fn checked_rate(key: &str, rate: f64, default: f64) -> f64 {
    if (0.0..1.0).contains(&rate) {
        rate
    } else {
        warn!("{} = {} is outside [0, 1); keeping default {}", key, rate, default);
        default
    }
}

/// Prices, intensities and baselines scale the series and must not be negative.
fn non_negative_or<T>(key: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Display + Copy,
{
    checked_non_negative(key, env_or(key, default), default)
}

fn checked_non_negative<T>(key: &str, value: T, default: T) -> T
where
    T: PartialOrd + Default + Display + Copy,
{
    // NaN fails the comparison too.
    if value >= T::default() {
        value
    } else {
        warn!("{} = {} is negative; keeping default {}", key, value, default);
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_minutes_are_bounded() {
        let default = Duration::from_secs(30 * 60);
        assert_eq!(ttl_from_minutes(45, default), Duration::from_secs(45 * 60));
        assert_eq!(
            ttl_from_minutes(MAX_CACHE_TTL_MINUTES, default),
            Duration::from_secs(MAX_CACHE_TTL_MINUTES * 60)
        );
        assert_eq!(ttl_from_minutes(MAX_CACHE_TTL_MINUTES + 1, default), default);
        assert_eq!(ttl_from_minutes(u64::MAX, default), default);
        assert_eq!(ttl_from_minutes(0, default), default);
    }

    #[test]
    fn test_rates_outside_unit_interval_keep_default() {
        assert_eq!(checked_rate("FORECAST_AFTER_RATE", 0.1, 0.06), 0.1);
        assert_eq!(checked_rate("FORECAST_AFTER_RATE", 1.0, 0.06), 0.06);
        assert_eq!(checked_rate("FORECAST_AFTER_RATE", -0.2, 0.06), 0.06);
        assert_eq!(checked_rate("FORECAST_AFTER_RATE", f64::NAN, 0.06), 0.06);
    }

    #[test]
    fn test_negative_projection_constants_keep_default() {
        assert_eq!(checked_non_negative("FORECAST_UNIT_PRICE", -150_i64, 150), 150);
        assert_eq!(checked_non_negative("FORECAST_UNIT_PRICE", 0_i64, 150), 0);
        assert_eq!(checked_non_negative("FORECAST_CAPEX_FIXED", 5_i64, 30_000_000), 5);
        assert_eq!(checked_non_negative("FORECAST_EUI_KWH_PER_M2", -1.0, 380.0), 380.0);
        assert_eq!(checked_non_negative("FORECAST_EUI_KWH_PER_M2", f64::NAN, 380.0), 380.0);
        assert_eq!(checked_non_negative("FORECAST_FALLBACK_BASELINE_KWH", 1.5e6, 2.15e6), 1.5e6);
    }
}
