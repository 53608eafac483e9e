use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use duckdb::Connection;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::enrich::agents::{definition, quality, tags};
use crate::store::catalog;
use crate::store::models::{ColumnRecord, TableRecord};
use crate::web::handlers::{db_error, get_conn, StatusMessage};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TableRef {
    pub table_name: String,
    pub schema_name: String,
}

fn load_table(
    conn: &Connection,
    table_ref: &TableRef,
) -> Result<(TableRecord, Vec<ColumnRecord>), (StatusCode, String)> {
    let table = catalog::find_table(conn, &table_ref.schema_name, &table_ref.table_name)
        .map_err(db_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Table not found".to_string()))?;
    let columns = catalog::columns_for_table(conn, table.id).map_err(db_error)?;
    Ok((table, columns))
}

pub async fn generate_definitions(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TableRef>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let (table, columns) = load_table(&conn, &payload)?;

    let definition = definition::generate_business_definition(&state.ai, &table, &columns).await;
    catalog::set_business_definition(&conn, table.id, &definition).map_err(db_error)?;

    info!("Stored business definition for {}.{}", table.schema_name, table.table_name);
    Ok(StatusMessage::success(
        "Business definition generated successfully.",
    ))
}

pub async fn calculate_quality(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TableRef>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let (table, columns) = load_table(&conn, &payload)?;

    let score = quality::score_data_quality(&state.ai, &table, &columns).await;
    catalog::set_quality_score(&conn, table.id, score).map_err(db_error)?;

    info!(
        "Stored quality score {} for {}.{}",
        score, table.schema_name, table.table_name
    );
    Ok(StatusMessage::success("Data quality score calculated."))
}

pub async fn generate_tags(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TableRef>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let (table, columns) = load_table(&conn, &payload)?;

    let tag_list = tags::generate_tags(&state.ai, &table, &columns).await;
    catalog::set_tags(&conn, table.id, &tag_list).map_err(db_error)?;

    info!(
        "Stored {} tags for {}.{}",
        tag_list.len(),
        table.schema_name,
        table.table_name
    );
    Ok(StatusMessage::success("Tags generated successfully."))
}
