pub mod keys;
pub mod memory;
pub mod sweeper;

pub use keys::CacheKey;
pub use memory::ForecastMemoryCache;
use crate::config::Config;

/// Build the in-process tier, or `None` when its capacity is configured as 0.
pub fn init_memory_cache(config: &Config) -> Option<ForecastMemoryCache> {
    (config.cache_max_capacity > 0)
        .then(|| ForecastMemoryCache::new(config.cache_max_capacity, config.cache_ttl))
}
