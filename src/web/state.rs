use crate::config::AppConfig;
use crate::enrich::GenAiManager;
use crate::ingest::federated::FederationClient;
use crate::store::pool::CatalogConnectionManager;
use r2d2::Pool;
use std::sync::Arc;

/// Shared application state for the web server. Nothing in here is mutable
/// across requests; the catalog store is the only shared state.
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: Pool<CatalogConnectionManager>,
    pub ai: GenAiManager,
    pub federation: Arc<dyn FederationClient>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db_pool: Pool<CatalogConnectionManager>,
        ai: GenAiManager,
        federation: Arc<dyn FederationClient>,
    ) -> Self {
        Self {
            config,
            db_pool,
            ai,
            federation,
            startup_time: chrono::Utc::now(),
        }
    }
}
