// Format-specific extractors. Each adapter normalizes one raw artifact into
// table/column (or lineage) rows and persists them in a single transaction;
// a failure anywhere rolls back the whole batch.

pub mod ddl;
pub mod diagram;
pub mod federated;
pub mod lineage_code;
pub mod tabular;

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum IngestError {
    IoError(std::io::Error),
    ParsingError(String),
    DatabaseError(String),
    UnsupportedFileType(String),
    ExtractionError(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::IoError(err) => write!(f, "IO error: {}", err),
            IngestError::ParsingError(msg) => write!(f, "Parsing error: {}", msg),
            IngestError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            IngestError::UnsupportedFileType(ext) => write!(f, "Unsupported file type: {}", ext),
            IngestError::ExtractionError(msg) => write!(f, "Extraction error: {}", msg),
        }
    }
}

impl Error for IngestError {}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::IoError(err)
    }
}

impl From<duckdb::Error> for IngestError {
    fn from(err: duckdb::Error) -> Self {
        IngestError::DatabaseError(err.to_string())
    }
}

/// Counts of catalog rows created by one adapter call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub tables: usize,
    pub columns: usize,
}
