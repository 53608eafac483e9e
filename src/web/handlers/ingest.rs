use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::enrich::agents::lineage;
use crate::ingest::{ddl, diagram, federated, lineage_code, tabular};
use crate::web::handlers::{get_conn, ingest_error_response, read_upload, StatusMessage};
use crate::web::state::AppState;

fn source_type_ok(state: &AppState, source_name: &str, expected: &str) -> bool {
    state
        .config
        .data_source(source_name)
        .map(|source| source.source_type == expected)
        .unwrap_or(false)
}

// Tabular upload: the whole sheet becomes one cataloged table
pub async fn process_tabular(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let upload = read_upload(&mut multipart).await?;
    if !upload.file_name.to_lowercase().ends_with(".csv") {
        return Err((StatusCode::BAD_REQUEST, "Invalid file type.".to_string()));
    }

    // Spool the sheet to disk so the engine's CSV sampler can read it
    let spool_dir = PathBuf::from(&state.config.data_dir).join("uploads");
    std::fs::create_dir_all(&spool_dir).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to spool upload: {}", e),
        )
    })?;
    let table_name = tabular::table_name_from_file(&upload.file_name);
    let spool_path = spool_dir.join(format!(
        "{}_{}.csv",
        chrono::Utc::now().timestamp_micros(),
        table_name
    ));
    std::fs::write(&spool_path, &upload.data).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to spool upload: {}", e),
        )
    })?;

    let mut conn = get_conn(&state)?;
    let result = tabular::TabularIngestor::new().ingest(&mut conn, &spool_path, &table_name);
    std::fs::remove_file(&spool_path).ok();
    let summary = result.map_err(ingest_error_response)?;

    info!(
        "Tabular upload '{}' cataloged as '{}' ({} columns)",
        upload.file_name, table_name, summary.columns
    );
    Ok(StatusMessage::success(format!(
        "Processed {} tables and {} columns from tabular file.",
        summary.tables, summary.columns
    )))
}

pub async fn process_sql_ddl(
    State(state): State<Arc<AppState>>,
    Path(source_name): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let upload = read_upload(&mut multipart).await?;
    if !upload.file_name.to_lowercase().ends_with(".sql") {
        return Err((StatusCode::BAD_REQUEST, "Invalid file type.".to_string()));
    }
    if !source_type_ok(&state, &source_name, "sql_ddl") {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Source '{}' not configured for SQL DDL.", source_name),
        ));
    }

    let sql = String::from_utf8(upload.data).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "DDL upload is not valid UTF-8.".to_string(),
        )
    })?;

    let mut conn = get_conn(&state)?;
    let summary = ddl::ingest(&mut conn, &sql).map_err(ingest_error_response)?;

    Ok(StatusMessage::success(format!(
        "Processed {} tables and {} columns from SQL DDL.",
        summary.tables, summary.columns
    )))
}

pub async fn process_starburst(
    State(state): State<Arc<AppState>>,
    Path(source_name): Path<String>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let Some(source) = state
        .config
        .data_source(&source_name)
        .filter(|s| s.source_type == "starburst")
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Source '{}' not configured for Starburst.", source_name),
        ));
    };

    let listing = state.federation.fetch_catalog(&source.options).map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Failed to fetch federated metadata: {}", e),
        )
    })?;

    let mut conn = get_conn(&state)?;
    let summary = federated::ingest(&mut conn, &listing).map_err(ingest_error_response)?;

    Ok(StatusMessage::success(format!(
        "Processed {} tables and {} columns from {}.",
        summary.tables, summary.columns, source_name
    )))
}

pub async fn process_image_diagram(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let upload = read_upload(&mut multipart).await?;
    let content_type = upload.content_type.clone().unwrap_or_default();
    if !diagram::ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid file type. Allowed types are: {}",
                diagram::ALLOWED_CONTENT_TYPES.join(", ")
            ),
        ));
    }

    let tables = diagram::collect_extractions(&state.ai, &upload.data, &content_type)
        .await
        .map_err(ingest_error_response)?;

    let mut conn = get_conn(&state)?;
    let summary = diagram::ingest(&mut conn, &tables).map_err(ingest_error_response)?;

    Ok(StatusMessage::success(format!(
        "Processed {} tables and {} columns from diagram.",
        summary.tables, summary.columns
    )))
}

pub async fn process_lineage_code(
    State(state): State<Arc<AppState>>,
    Path((code_type, source_name)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let Some(extension) = lineage_code::extension_for(&code_type) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid code type. Supported types are 'sql' and 'pyspark_sql'.".to_string(),
        ));
    };

    let upload = read_upload(&mut multipart).await?;
    if !upload.file_name.to_lowercase().ends_with(extension) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid file type. Only {} files are supported for {} lineage.",
                extension, code_type
            ),
        ));
    }
    if !source_type_ok(&state, &source_name, "sql_lineage") {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Source '{}' not configured for {} lineage.", source_name, code_type),
        ));
    }

    let code = String::from_utf8(upload.data).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Code upload is not valid UTF-8.".to_string(),
        )
    })?;

    let extractions = lineage::extract_lineage(&state.ai, &code, &code_type).await;
    if extractions.is_empty() {
        return Ok(StatusMessage::success(format!(
            "No lineage information could be extracted from the {} file.",
            code_type
        )));
    }

    let mut conn = get_conn(&state)?;
    let edge_count =
        lineage_code::ingest(&mut conn, &extractions).map_err(ingest_error_response)?;

    Ok(StatusMessage::success(format!(
        "Extracted and stored {} lineage relationships from {}.",
        edge_count, code_type
    )))
}
