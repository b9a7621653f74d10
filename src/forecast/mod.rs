pub mod context;
pub mod projection;
pub mod range;
pub mod scoring;
pub mod service;

pub use context::{ForecastContext, ForecastQuery};
pub use projection::{project, ProjectionParams};
pub use range::YearRange;
pub use scoring::{Label, ScoringRules, Verdict};
pub use service::ForecastService;
