//! Forecast request inputs and their normalized form

use super::range::YearRange;

/// Scenario label used when the caller leaves it blank.
pub const DEFAULT_SCENARIO: &str = "default";

/// Raw, optional inputs of a forecast request as they arrive from a caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastQuery {
    pub building_id: Option<i64>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub scenario: Option<String>,
    pub built_year: Option<i32>,
    pub usage: Option<String>,
    pub floor_area_m2: Option<f64>,
    pub pnu: Option<String>,
}

/// A request after normalization: every field that affects the result, in canonical form.
///
/// Two queries that differ only in ways normalization removes (whitespace around
/// `use`/`pnu`, a blank scenario, a non-positive `builtYear`) produce equal contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastContext {
    pub building_id: Option<i64>,
    pub range: YearRange,
    pub scenario: String,
    pub built_year: Option<i32>,
    pub usage: Option<String>,
    pub floor_area_m2: Option<f64>,
    pub pnu: Option<String>,
}

impl ForecastContext {
    pub fn from_query(query: ForecastQuery, current_year: i32, horizon: i32) -> Self {
        Self {
            building_id: query.building_id,
            range: YearRange::resolve(query.year_from, query.year_to, current_year, horizon),
            scenario: non_blank(query.scenario).unwrap_or_else(|| DEFAULT_SCENARIO.to_string()),
            built_year: query.built_year.filter(|y| *y > 0),
            usage: non_blank(query.usage),
            floor_area_m2: query.floor_area_m2.filter(|a| a.is_finite() && *a > 0.0),
            pnu: non_blank(query.pnu),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
