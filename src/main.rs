use clap::Parser;
use r2d2::Pool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod enrich;
mod ingest;
mod store;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::enrich::GenAiManager;
use crate::ingest::federated::FixtureFederationClient;
use crate::store::pool::CatalogConnectionManager;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Ensure data directory exists for upload spooling
    let data_dir = PathBuf::from(&config.data_dir);
    if !data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir);
        std::fs::create_dir_all(&data_dir)?;
    }

    info!("Initializing catalog store connection pool");
    let db_manager = CatalogConnectionManager::new(config.database.connection_string.clone());
    let pool = Pool::builder()
        .max_size(config.database.pool_size as u32)
        .build(db_manager)?;

    // Create the catalog tables on first start
    {
        let conn = pool.get()?;
        store::schema::initialize(&conn)?;
    }

    // Initialize the generation backend
    info!("Initializing generation backend: {}", config.ai.backend);
    let ai = GenAiManager::new(&config.ai)?;
    if !ai.is_configured() {
        info!("No generation service configured; enrichment agents will serve mock responses");
    }

    // Create application state; the federation connector is the fixture
    // implementation until a live coordinator is wired in
    let app_state = Arc::new(AppState::new(
        config.clone(),
        pool,
        ai,
        Arc::new(FixtureFederationClient),
    ));

    // Start the web server
    info!("Starting metacat server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(Box::new(std::io::Error::other(e.to_string())) as Box<dyn std::error::Error>);
        }
    }

    Ok(())
}
