use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::store::catalog;
use crate::store::models::{FeedbackRecord, NewFeedbackRecord};
use crate::web::handlers::{db_error, get_conn, StatusMessage};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub table_id: i64,
    #[serde(default)]
    pub column_id: Option<i64>,
    pub feedback: String,
}

/// Validates the referenced table (and column, when given) before appending
/// the entry; both feedback endpoints share this path so all feedback lands
/// in the same store-backed table.
fn store_feedback(
    state: &AppState,
    payload: &FeedbackRequest,
) -> Result<FeedbackRecord, (StatusCode, String)> {
    let conn = get_conn(state)?;

    catalog::get_table(&conn, payload.table_id)
        .map_err(db_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Table not found".to_string()))?;
    if let Some(column_id) = payload.column_id {
        catalog::get_column(&conn, column_id)
            .map_err(db_error)?
            .ok_or_else(|| (StatusCode::NOT_FOUND, "Column not found".to_string()))?;
    }

    catalog::insert_feedback(
        &conn,
        &NewFeedbackRecord {
            table_id: payload.table_id,
            column_id: payload.column_id,
            feedback_text: payload.feedback.clone(),
        },
    )
    .map_err(db_error)
}

pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<StatusMessage>, (StatusCode, String)> {
    store_feedback(&state, &payload)?;
    Ok(StatusMessage::success("Feedback submitted successfully."))
}

pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackRecord>), (StatusCode, String)> {
    let entry = store_feedback(&state, &payload)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeedbackRecord>>, (StatusCode, String)> {
    let conn = get_conn(&state)?;
    let entries = catalog::list_feedback(&conn).map_err(db_error)?;
    Ok(Json(entries))
}
