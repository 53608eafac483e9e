use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::catalog;
use crate::store::models::TableRecord;
use crate::web::handlers::{db_error, get_conn, StatusMessage};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// A cataloged table with its one-hop lineage neighbors resolved to names.
#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub id: i64,
    pub table_name: String,
    pub schema_name: String,
    pub source: Option<String>,
    pub business_definition: Option<String>,
    pub data_quality_score: Option<i32>,
    pub tags: Vec<String>,
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn summarize(conn: &Connection, table: TableRecord) -> Result<TableSummary, (StatusCode, String)> {
    let upstream = catalog::upstream_table_names(conn, table.id).map_err(db_error)?;
    let downstream = catalog::downstream_table_names(conn, table.id).map_err(db_error)?;
    Ok(TableSummary {
        id: table.id,
        table_name: table.table_name,
        schema_name: table.schema_name,
        source: table.source,
        business_definition: table.business_definition,
        data_quality_score: table.data_quality_score,
        tags: table.tags,
        upstream,
        downstream,
        created_at: table.created_at,
        updated_at: table.updated_at,
    })
}

pub async fn list_tables(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TableSummary>>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let tables = catalog::list_tables(&conn, params.search.as_deref()).map_err(db_error)?;

    let mut summaries = Vec::with_capacity(tables.len());
    for table in tables {
        summaries.push(summarize(&conn, table)?);
    }
    Ok(Json(summaries))
}

/// Domains are the distinct schema names present in the catalog.
#[derive(Debug, Serialize)]
pub struct Domain {
    pub domain_id: String,
    pub domain_name: String,
    pub dataset_count: i64,
}

pub async fn list_domains(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Domain>>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let schemas = catalog::list_schemas(&conn).map_err(db_error)?;
    let domains = schemas
        .into_iter()
        .map(|(schema_name, dataset_count)| Domain {
            domain_id: schema_name.clone(),
            domain_name: schema_name,
            dataset_count,
        })
        .collect();
    Ok(Json(domains))
}

#[derive(Debug, Serialize)]
pub struct Dataset {
    pub dataset_id: i64,
    pub domain_id: String,
    pub table_name: String,
    pub description: String,
}

pub async fn datasets_by_domain(
    State(state): State<Arc<AppState>>,
    Path(domain_id): Path<String>,
) -> Result<Json<Vec<Dataset>>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let tables = catalog::tables_in_schema(&conn, &domain_id).map_err(db_error)?;
    if tables.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            "No datasets found for this domain".to_string(),
        ));
    }

    let datasets = tables
        .into_iter()
        .map(|table| Dataset {
            dataset_id: table.id,
            domain_id: table.schema_name,
            table_name: table.table_name,
            description: table.business_definition.unwrap_or_default(),
        })
        .collect();
    Ok(Json(datasets))
}

#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatasetMetadata {
    pub dataset_id: i64,
    pub table_name: String,
    pub schema_name: String,
    pub source: Option<String>,
    pub business_definition: Option<String>,
    pub data_quality_score: Option<i32>,
    pub tags: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

pub async fn dataset_metadata(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<DatasetMetadata>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let table = catalog::get_table(&conn, dataset_id)
        .map_err(db_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Dataset metadata not found".to_string()))?;

    let columns = catalog::columns_for_table(&conn, table.id)
        .map_err(db_error)?
        .into_iter()
        .map(|column| ColumnInfo {
            column_name: column.column_name,
            data_type: column.data_type,
            description: column.description,
        })
        .collect();
    let upstream = catalog::upstream_table_names(&conn, table.id).map_err(db_error)?;
    let downstream = catalog::downstream_table_names(&conn, table.id).map_err(db_error)?;

    Ok(Json(DatasetMetadata {
        dataset_id: table.id,
        table_name: table.table_name,
        schema_name: table.schema_name,
        source: table.source,
        business_definition: table.business_definition,
        data_quality_score: table.data_quality_score,
        tags: table.tags,
        columns,
        upstream,
        downstream,
        created_at: table.created_at,
        updated_at: table.updated_at,
    }))
}

/// Removes a table and everything referencing it (columns, lineage edges,
/// feedback) in one transaction.
pub async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    let mut conn = get_conn(&state)?;
    let tx = conn.transaction().map_err(db_error)?;
    let existed = catalog::delete_table(&tx, dataset_id).map_err(db_error)?;
    if !existed {
        return Err((
            StatusCode::NOT_FOUND,
            "Dataset metadata not found".to_string(),
        ));
    }
    tx.commit().map_err(db_error)?;

    Ok(StatusMessage::success(
        "Dataset and dependent metadata deleted.",
    ))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: String,
    pub service: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        service: "metacat".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub table_count: i64,
    pub column_count: i64,
    pub lineage_count: i64,
    pub feedback_count: i64,
}

pub async fn system_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, (StatusCode, String)> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();

    let conn = get_conn(&state)?;
    let counts = catalog::counts(&conn).map_err(db_error)?;

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        table_count: counts.tables,
        column_count: counts.columns,
        lineage_count: counts.lineage_edges,
        feedback_count: counts.feedback_entries,
    }))
}
