pub mod connection;
pub mod forecast_cache;
pub mod migration;

pub use forecast_cache::CacheStoreError;
