use crate::ingest::{IngestError, IngestSummary};
use crate::store::catalog;
use crate::store::models::{NewColumnRecord, NewTableRecord};
use duckdb::Connection;
use std::path::Path;

const SOURCE_LABEL: &str = "Tabular Upload";

pub struct TabularIngestor {
    sample_size: usize,
}

impl TabularIngestor {
    pub fn new() -> Self {
        Self {
            sample_size: 1000, // Default sample size for type inference
        }
    }

    /// Rejects artifacts that do not parse as a tabular sheet before any
    /// store write happens.
    fn validate_sheet(&self, path: &Path) -> Result<(), IngestError> {
        let mut reader =
            csv::Reader::from_path(path).map_err(|e| IngestError::ParsingError(e.to_string()))?;
        let headers = reader
            .headers()
            .map_err(|e| IngestError::ParsingError(e.to_string()))?;
        if headers.is_empty() {
            return Err(IngestError::ParsingError(
                "Sheet has no columns".to_string(),
            ));
        }
        Ok(())
    }

    /// Infers column names and types with a scratch in-memory connection and
    /// the engine's own CSV sampling.
    fn infer_columns(&self, path: &Path) -> Result<Vec<(String, String)>, IngestError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| IngestError::DatabaseError(e.to_string()))?;

        let escaped_path = path.to_string_lossy().replace('\'', "''");
        conn.execute(
            &format!(
                "CREATE TABLE sheet_probe AS SELECT * FROM read_csv_auto('{}', SAMPLE_SIZE={})",
                escaped_path, self.sample_size
            ),
            [],
        )
        .map_err(|e| IngestError::DatabaseError(e.to_string()))?;

        let mut stmt = conn
            .prepare("PRAGMA table_info(sheet_probe)")
            .map_err(|e| IngestError::DatabaseError(e.to_string()))?;

        let column_iter = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(|e| IngestError::DatabaseError(e.to_string()))?;

        let columns: Result<Vec<(String, String)>, _> = column_iter.collect();
        columns.map_err(|e| IngestError::DatabaseError(e.to_string()))
    }

    /// Catalogs the whole sheet as one table; every sheet column becomes one
    /// catalog column with its inferred type and a type-derived description.
    pub fn ingest(
        &self,
        conn: &mut Connection,
        path: &Path,
        table_name: &str,
    ) -> Result<IngestSummary, IngestError> {
        self.validate_sheet(path)?;
        let columns = self.infer_columns(path)?;

        let tx = conn.transaction()?;
        let table_id = catalog::insert_table(
            &tx,
            &NewTableRecord {
                table_name: table_name.to_string(),
                schema_name: "public".to_string(),
                source: Some(SOURCE_LABEL.to_string()),
            },
        )?;

        for (column_name, data_type) in &columns {
            catalog::insert_column(
                &tx,
                &NewColumnRecord {
                    table_id,
                    column_name: column_name.clone(),
                    data_type: Some(data_type.clone()),
                    description: Some(format!(
                        "Column loaded from tabular file. Data type: {}",
                        data_type
                    )),
                },
            )?;
        }
        tx.commit()?;

        Ok(IngestSummary {
            tables: 1,
            columns: columns.len(),
        })
    }
}

impl Default for TabularIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the catalog table name from an uploaded file name: the stem,
/// lowercased, with anything outside [a-z0-9] folded to underscores.
pub fn table_name_from_file(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    let mut name: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let name = name.trim_matches('_');
    if name.is_empty() {
        "uploaded_sheet".to_string()
    } else {
        name.to_string()
    }
}
