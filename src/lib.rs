pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod forecast;
pub mod models;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use db::connection;
pub use db::forecast_cache;
pub use db::migration;
pub use models::{CacheEntry, ForecastResult};
pub use forecast::{ForecastQuery, ForecastService, Label, Verdict};
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::create_router;
