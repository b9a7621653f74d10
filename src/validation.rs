use thiserror::Error;

/// Earliest and latest year accepted at the HTTP boundary.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;
/// Widest `from..=to` span a single request may ask for.
pub const MAX_RANGE_YEARS: i32 = 100;
/// Largest floor area accepted at the HTTP boundary, m² (10 km²).
pub const MAX_FLOOR_AREA_M2: f64 = 10_000_000.0;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid year range: {0}")]
    InvalidYearRange(String),

    #[error("Invalid cache key: {0}")]
    InvalidCacheKey(String),
}

/// Parse an optional query value; blank counts as absent.
fn parse_optional<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidParameter(format!("{} = {}", name, v))),
    }
}

pub fn validate_year(name: &str, value: Option<&str>) -> Result<Option<i32>, ValidationError> {
    let year = parse_optional::<i32>(name, value)?;
    match year {
        Some(y) if !(MIN_YEAR..=MAX_YEAR).contains(&y) => Err(ValidationError::InvalidYearRange(
            format!("{} must be between {} and {}", name, MIN_YEAR, MAX_YEAR),
        )),
        _ => Ok(year),
    }
}

/// Reject spans that would produce absurdly long series. Order does not matter.
pub fn validate_span(from: Option<i32>, to: Option<i32>) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (from, to) {
        if (to - from).abs() > MAX_RANGE_YEARS {
            return Err(ValidationError::InvalidYearRange(format!(
                "range may cover at most {} years",
                MAX_RANGE_YEARS
            )));
        }
    }
    Ok(())
}

/// Non-positive build years mean "unknown" and are dropped.
pub fn validate_built_year(value: Option<&str>) -> Result<Option<i32>, ValidationError> {
    Ok(parse_optional::<i32>("builtYear", value)?.filter(|y| *y > 0))
}

/// Floor area must be finite and at most `MAX_FLOOR_AREA_M2`; non-positive values fall back later.
pub fn validate_floor_area(value: Option<&str>) -> Result<Option<f64>, ValidationError> {
    let area = parse_optional::<f64>("floorArea", value)?;
    match area {
        Some(a) if !a.is_finite() => Err(ValidationError::InvalidParameter(format!(
            "floorArea must be finite, got {}",
            a
        ))),
        Some(a) if a > MAX_FLOOR_AREA_M2 => Err(ValidationError::InvalidParameter(format!(
            "floorArea must be at most {}, got {}",
            MAX_FLOOR_AREA_M2, a
        ))),
        _ => Ok(area),
    }
}

/// Requests without a building id must carry a positive build year or a parcel id.
pub fn validate_context(built_year: Option<i32>, pnu: Option<&str>) -> Result<(), ValidationError> {
    let has_pnu = pnu.is_some_and(|p| !p.trim().is_empty());
    if built_year.is_none() && !has_pnu {
        return Err(ValidationError::MissingParameter("builtYear or pnu".to_string()));
    }
    Ok(())
}

pub fn validate_saving_pct(value: Option<&str>) -> Result<f64, ValidationError> {
    let pct = parse_optional::<f64>("savingPct", value)?
        .ok_or_else(|| ValidationError::MissingParameter("savingPct".to_string()))?;
    if !pct.is_finite() {
        return Err(ValidationError::InvalidParameter(format!("savingPct = {}", pct)));
    }
    Ok(pct)
}

/// Accepts `inf`/`infinity` for an unbounded payback; rejects NaN and negatives.
pub fn validate_payback(value: Option<&str>) -> Result<f64, ValidationError> {
    let years = parse_optional::<f64>("paybackYears", value)?
        .ok_or_else(|| ValidationError::MissingParameter("paybackYears".to_string()))?;
    if years.is_nan() || years < 0.0 {
        return Err(ValidationError::InvalidParameter(format!("paybackYears = {}", years)));
    }
    Ok(years)
}

pub fn validate_key_hash(key_hash: &str) -> Result<(), ValidationError> {
    let valid = key_hash.len() == 64
        && key_hash.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !valid {
        return Err(ValidationError::InvalidCacheKey(key_hash.to_string()));
    }
    Ok(())
}
