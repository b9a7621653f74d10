use crate::config::Config;
use crate::forecast::ForecastService;
use sqlx::SqlitePool;

pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub forecast: ForecastService,
}

impl AppState {
    pub fn new(config: Config, db_pool: SqlitePool) -> Self {
        let forecast = ForecastService::new(db_pool.clone(), &config);
        Self { config, db_pool, forecast }
    }
}
