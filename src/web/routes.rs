use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Operational
        .route("/health", get(handlers::catalog::health))
        .route("/status", get(handlers::catalog::system_status))

        // Read and search
        .route("/tables", get(handlers::catalog::list_tables))
        .route("/domains", get(handlers::catalog::list_domains))
        .route("/datasets/by-domain/{domain_id}", get(handlers::catalog::datasets_by_domain))
        .route("/datasets/{dataset_id}/metadata", get(handlers::catalog::dataset_metadata))
        .route("/datasets/{dataset_id}", delete(handlers::catalog::delete_dataset))

        // Ingestion adapters
        .route("/process/tabular", post(handlers::ingest::process_tabular))
        .route("/process/sql-ddl/{source_name}", post(handlers::ingest::process_sql_ddl))
        .route("/process/starburst/{source_name}", post(handlers::ingest::process_starburst))
        .route("/process/image-diagram", post(handlers::ingest::process_image_diagram))
        .route(
            "/process/lineage-code/{code_type}/{source_name}",
            post(handlers::ingest::process_lineage_code),
        )

        // Enrichment agents
        .route("/generate-definitions", post(handlers::enrich::generate_definitions))
        .route("/calculate-quality", post(handlers::enrich::calculate_quality))
        .route("/generate-tags", post(handlers::enrich::generate_tags))

        // Feedback
        .route("/submit-feedback", post(handlers::feedback::submit_feedback))
        .route(
            "/feedback",
            post(handlers::feedback::create_feedback).get(handlers::feedback::list_feedback),
        )
}
