pub mod catalog;
pub mod enrich;
pub mod feedback;
pub mod ingest;

use crate::store::pool::CatalogConnectionManager;
use crate::web::state::AppState;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success".to_string(),
            message: message.into(),
        })
    }
}

pub(crate) fn get_conn(
    state: &AppState,
) -> Result<r2d2::PooledConnection<CatalogConnectionManager>, (StatusCode, String)> {
    state.db_pool.get().map_err(|e| {
        error!("Failed to get DB connection: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database connection error".to_string(),
        )
    })
}

pub(crate) fn db_error(e: duckdb::Error) -> (StatusCode, String) {
    error!("Catalog store error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", e),
    )
}

/// One uploaded file pulled out of a multipart body.
pub(crate) struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Reads the first file-bearing field from a multipart upload.
pub(crate) async fn read_upload(multipart: &mut Multipart) -> Result<Upload, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart payload: {}", e),
        )
    })? {
        let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
            continue;
        };
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read upload: {}", e)))?
            .to_vec();
        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Err((
        StatusCode::BAD_REQUEST,
        "No file field in upload".to_string(),
    ))
}

pub(crate) fn ingest_error_response(e: crate::ingest::IngestError) -> (StatusCode, String) {
    use crate::ingest::IngestError;
    error!("Ingestion failed: {}", e);
    let status = match &e {
        IngestError::ParsingError(_) | IngestError::UnsupportedFileType(_) => {
            StatusCode::BAD_REQUEST
        }
        IngestError::IoError(_) | IngestError::DatabaseError(_) | IngestError::ExtractionError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
