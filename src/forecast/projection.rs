//! Deterministic energy and cost projection
//!
//! The percentage decay is the same for every building, so every chart improves
//! monotonically. Only the scale changes: the baseline comes from floor area
//! times a fixed energy-use intensity.

use super::range::YearRange;
use crate::models::{Cost, ForecastResult, Kpi, Series};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParams {
    /// Energy-use intensity, kWh per m² per year
    pub eui_kwh_per_m2: f64,
    /// Yearly decline of post-retrofit consumption
    pub after_rate: f64,
    /// Yearly decline of the saving, also the first-year saving share of baseline
    pub saving_rate: f64,
    /// KRW per kWh
    pub unit_price: i64,
    /// KRW
    pub capex_fixed: i64,
    /// KRW per m²
    pub capex_per_m2: i64,
    /// Baseline used when the floor area is unknown
    pub fallback_baseline_kwh: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            eui_kwh_per_m2: 380.0,
            after_rate: 0.06,
            saving_rate: 0.08,
            unit_price: 150,
            capex_fixed: 30_000_000,
            capex_per_m2: 200_000,
            fallback_baseline_kwh: 2_150_000.0,
        }
    }
}

impl ProjectionParams {
    pub fn baseline_kwh(&self, floor_area_m2: Option<f64>) -> f64 {
        match positive_area(floor_area_m2) {
            Some(area) => area * self.eui_kwh_per_m2,
            None => self.fallback_baseline_kwh,
        }
    }

    pub fn capex(&self, floor_area_m2: Option<f64>) -> i64 {
        let area = positive_area(floor_area_m2).unwrap_or(0.0);
        // Float-to-int casts saturate; keep the sum saturating too.
        self.capex_fixed
            .saturating_add((self.capex_per_m2 as f64 * area).round() as i64)
    }

    /// Fixed display percentage, not recomputed from the series.
    pub fn saving_pct(&self) -> i32 {
        (self.saving_rate * 100.0).round() as i32
    }
}

fn positive_area(floor_area_m2: Option<f64>) -> Option<f64> {
    floor_area_m2.filter(|a| a.is_finite() && *a > 0.0)
}

pub fn project(range: YearRange, floor_area_m2: Option<f64>, params: &ProjectionParams) -> ForecastResult {
    let len = range.len();
    let baseline = params.baseline_kwh(floor_area_m2);

    let years = range.years().map(|y| y.to_string()).collect();

    // The first projected year is already one step below baseline.
    let after: Vec<i64> = (0..len)
        .map(|i| decay(baseline, params.after_rate, i + 1))
        .collect();

    let start_saving = (baseline * params.saving_rate).round();
    let saving: Vec<i64> = (0..len)
        .map(|i| decay(start_saving, params.saving_rate, i))
        .collect();

    let cost_saving: Vec<i64> = saving
        .iter()
        .map(|kwh| kwh.saturating_mul(params.unit_price).max(0))
        .collect();

    let last = len - 1;
    let saving_kwh_yr = saving[last];
    let saving_cost_yr = cost_saving[last];
    let payback_years = payback(params.capex(floor_area_m2), saving_cost_yr);

    ForecastResult {
        years,
        series: Series { after, saving },
        cost: Cost { saving: cost_saving },
        kpi: Kpi {
            saving_kwh_yr,
            saving_cost_yr,
            saving_pct: params.saving_pct(),
            payback_years,
        },
    }
}

fn decay(start: f64, rate: f64, steps: usize) -> i64 {
    let value = (start * (1.0 - rate).powi(steps as i32)).round() as i64;
    value.max(0)
}

/// Years to recover `capex`, rounded to 2 decimals; infinite without any saving.
fn payback(capex: i64, saving_cost_yr: i64) -> f64 {
    if saving_cost_yr <= 0 {
        return f64::INFINITY;
    }
    let years = capex as f64 / saving_cost_yr as f64;
    (years * 100.0).round() / 100.0
}
