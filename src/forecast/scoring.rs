//! Retrofit recommendation scoring
//!
//! The front-end and the ML service re-derive labels from the same KPI numbers,
//! so they consume these exact rules (served at `/api/forecast/rules`).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Recommend,
    Conditional,
    NotRecommend,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Recommend => "RECOMMEND",
            Label::Conditional => "CONDITIONAL",
            Label::NotRecommend => "NOT_RECOMMEND",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub score: u32,
    pub label: Label,
}

/// Thresholds shared by every evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRules {
    /// Guard: saving percentages below this are never recommended
    pub min_saving_pct: f64,
    /// Guard: paybacks above this are never recommended
    pub max_payback_years: f64,
    pub saving_pct_high: f64,
    pub saving_pct_mid: f64,
    pub payback_fast: f64,
    pub payback_moderate: f64,
    pub age_old: i32,
    pub age_mid: i32,
    pub recommend_min_score: u32,
    pub conditional_min_score: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            min_saving_pct: 5.0,
            max_payback_years: 12.0,
            saving_pct_high: 18.0,
            saving_pct_mid: 10.0,
            payback_fast: 8.0,
            payback_moderate: 12.0,
            age_old: 25,
            age_mid: 10,
            recommend_min_score: 4,
            conditional_min_score: 2,
        }
    }
}

impl ScoringRules {
    /// Score a KPI triple. `current_year` is passed in so results are reproducible.
    pub fn score(
        &self,
        saving_pct: f64,
        payback_years: f64,
        built_year: Option<i32>,
        current_year: i32,
    ) -> Verdict {
        // NaN fails every comparison, so check it explicitly.
        if saving_pct.is_nan()
            || payback_years.is_nan()
            || saving_pct < self.min_saving_pct
            || payback_years > self.max_payback_years
        {
            return Verdict { score: 0, label: Label::NotRecommend };
        }

        let pct_points = if saving_pct >= self.saving_pct_high {
            2
        } else if saving_pct >= self.saving_pct_mid {
            1
        } else {
            0
        };

        let payback_points = if payback_years <= self.payback_fast {
            2
        } else if payback_years <= self.payback_moderate {
            1
        } else {
            0
        };

        let score = pct_points + payback_points + self.age_points(built_year, current_year);
        Verdict { score, label: self.label_for(score) }
    }

    /// Unknown, non-positive or future build years score the neutral 1 point.
    fn age_points(&self, built_year: Option<i32>, current_year: i32) -> u32 {
        match built_year {
            Some(year) if year > 0 && year <= current_year => {
                let age = current_year - year;
                if age >= self.age_old {
                    2
                } else if age >= self.age_mid {
                    1
                } else {
                    0
                }
            }
            _ => 1,
        }
    }

    fn label_for(&self, score: u32) -> Label {
        if score >= self.recommend_min_score {
            Label::Recommend
        } else if score >= self.conditional_min_score {
            Label::Conditional
        } else {
            Label::NotRecommend
        }
    }
}
