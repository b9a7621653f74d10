// Forecast result schema (the cached payload and the HTTP body)
// Cache table row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub years: Vec<String>,
    pub series: Series,
    pub cost: Cost,
    pub kpi: Kpi,
}

/// Energy series in kWh/year, index-aligned with `years`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub after: Vec<i64>,
    pub saving: Vec<i64>,
}

/// Cost saving series in KRW/year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub saving: Vec<i64>,
}

/// Last-year summary of a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub saving_kwh_yr: i64,
    pub saving_cost_yr: i64,
    pub saving_pct: i32,
    /// `f64::INFINITY` when there is no cost saving to pay the investment back.
    #[serde(with = "payback_years")]
    pub payback_years: f64,
}

/// JSON has no infinity: an unbounded payback travels as `null`.
mod payback_years {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// One row of the `api_cache` table
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key_hash: String,
    pub key_raw: String,
    pub payload: ForecastResult,
    pub building_id: Option<i64>,
    pub guest_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
