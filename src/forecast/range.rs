//! Inclusive year range normalization

/// Years added to `to` when a request collapses to a single year (7 years inclusive).
pub const DEFAULT_HORIZON_YEARS: i32 = 6;

/// A closed, inclusive year range with `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    from: i32,
    to: i32,
}

impl YearRange {
    /// Swap reversed bounds, then extend a single-year range by `horizon`.
    pub fn normalize(from: i32, to: i32, horizon: i32) -> Self {
        let (from, mut to) = if to < from { (to, from) } else { (from, to) };
        if to == from {
            to = from.saturating_add(horizon.max(0));
        }
        Self { from, to }
    }

    /// Fill in missing bounds (`from` = current year, `to` = `from + horizon`), then normalize.
    pub fn resolve(from: Option<i32>, to: Option<i32>, current_year: i32, horizon: i32) -> Self {
        let from = from.unwrap_or(current_year);
        let to = to.unwrap_or_else(|| from.saturating_add(horizon.max(0)));
        Self::normalize(from, to, horizon)
    }

    pub fn from(&self) -> i32 {
        self.from
    }

    pub fn to(&self) -> i32 {
        self.to
    }

    pub fn len(&self) -> usize {
        (i64::from(self.to) - i64::from(self.from) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.from..=self.to
    }
}
