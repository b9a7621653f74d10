//! Cache key generation for forecast results

use crate::forecast::context::ForecastContext;
use sha2::{Digest, Sha256};

/// Written in place of an absent field. Present values are always
/// length-prefixed (`<len>:<value>`), so they start with a digit and never equal this.
const ABSENT: &str = "~";

/// The identity of a cached forecast: the canonical string and its SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    raw: String,
    hash: String,
}

impl CacheKey {
    /// Build the key for a normalized context.
    ///
    /// Field order is fixed: building id, range, scenario, built year, use,
    /// floor area, pnu. Every field that changes the computed result is included.
    pub fn for_context(ctx: &ForecastContext) -> Self {
        let raw = [
            ("buildingId", ctx.building_id.map(|id| id.to_string())),
            ("from", Some(ctx.range.from().to_string())),
            ("to", Some(ctx.range.to().to_string())),
            ("scenario", Some(ctx.scenario.clone())),
            ("builtYear", ctx.built_year.map(|y| y.to_string())),
            ("use", ctx.usage.clone()),
            ("floorArea", ctx.floor_area_m2.map(|a| a.to_string())),
            ("pnu", ctx.pnu.clone()),
        ]
        .iter()
        .map(|(name, value)| match value {
            Some(v) => format!("{}={}:{}", name, v.len(), v),
            None => format!("{}={}", name, ABSENT),
        })
        .collect::<Vec<_>>()
        .join(";");

        Self::from_raw(raw)
    }

    fn from_raw(raw: String) -> Self {
        let hash = sha256_hex(&raw);
        Self { raw, hash }
    }

    /// Pre-hash canonical string, kept for diagnostics only
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 64-char lowercase hex digest used for lookups
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
