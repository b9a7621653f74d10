use crate::{
    api::{error::ApiError, response::ApiResponse},
    forecast::{ForecastQuery, ProjectionParams, ScoringRules},
    state::AppState,
    validation::{
        validate_built_year, validate_context, validate_floor_area, validate_key_hash,
        validate_payback, validate_saving_pct, validate_span, validate_year,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// GET /api/forecast and /api/forecast/{id} query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub scenario: Option<String>,
    pub built_year: Option<String>,
    #[serde(rename = "use")]
    pub usage: Option<String>,
    pub floor_area: Option<String>,
    pub pnu: Option<String>,
}

// GET /api/forecast/score query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreParams {
    pub saving_pct: Option<String>,
    pub payback_years: Option<String>,
    pub built_year: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesBody<'a> {
    scoring: &'a ScoringRules,
    projection: &'a ProjectionParams,
    range_horizon_years: i32,
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/forecast", get(forecast_without_building))
        .route("/api/forecast/rules", get(scoring_rules))
        .route("/api/forecast/score", get(score))
        .route("/api/forecast/cache/{key_hash}", delete(invalidate_cache))
        .route("/api/forecast/{id}", get(forecast_for_building))
        .with_state(app_state)
}

// GET /api/forecast handler
async fn forecast_without_building(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ForecastParams>,
) -> Result<Response, ApiError> {
    let query = parse_forecast_params(None, &params)?;
    validate_context(query.built_year, query.pnu.as_deref())?;

    let result = state.forecast.compute_or_fetch(query, guest_ip(&headers)).await;
    Ok(ApiResponse::new(result).into_response())
}

// GET /api/forecast/{id} handler
async fn forecast_for_building(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<i64>,
    headers: HeaderMap,
    Query(params): Query<ForecastParams>,
) -> Result<Response, ApiError> {
    let query = parse_forecast_params(Some(building_id), &params)?;

    let result = state.forecast.compute_or_fetch(query, guest_ip(&headers)).await;
    Ok(ApiResponse::new(result).into_response())
}

// GET /api/forecast/rules handler
async fn scoring_rules(State(state): State<Arc<AppState>>) -> Response {
    ApiResponse::new(RulesBody {
        scoring: state.forecast.rules(),
        projection: state.forecast.params(),
        range_horizon_years: state.config.range_horizon_years,
    })
    .into_response()
}

// GET /api/forecast/score handler
async fn score(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScoreParams>,
) -> Result<Response, ApiError> {
    let saving_pct = validate_saving_pct(params.saving_pct.as_deref())?;
    let payback_years = validate_payback(params.payback_years.as_deref())?;
    let built_year = validate_built_year(params.built_year.as_deref())?;

    let verdict = state
        .forecast
        .rules()
        .score(saving_pct, payback_years, built_year, Utc::now().year());
    Ok(ApiResponse::new(verdict).into_response())
}

// DELETE /api/forecast/cache/{key_hash} handler
async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
    Path(key_hash): Path<String>,
) -> Result<Response, ApiError> {
    validate_key_hash(&key_hash)?;

    if state.forecast.invalidate(&key_hash).await? {
        info!("Invalidated forecast cache entry {}", key_hash);
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound(format!("cache entry {}", key_hash)))
    }
}

fn parse_forecast_params(building_id: Option<i64>, params: &ForecastParams) -> Result<ForecastQuery, ApiError> {
    let year_from = validate_year("from", params.from.as_deref())?;
    let year_to = validate_year("to", params.to.as_deref())?;
    // A missing `from` defaults to this year, which also bounds the span.
    validate_span(Some(year_from.unwrap_or_else(|| Utc::now().year())), year_to)?;

    Ok(ForecastQuery {
        building_id,
        year_from,
        year_to,
        scenario: params.scenario.clone(),
        built_year: validate_built_year(params.built_year.as_deref())?,
        usage: params.usage.clone(),
        floor_area_m2: validate_floor_area(params.floor_area.as_deref())?,
        pnu: params.pnu.clone(),
    })
}

/// First hop of `X-Forwarded-For`, if any.
fn guest_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
