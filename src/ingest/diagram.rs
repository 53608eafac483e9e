use crate::enrich::agents::diagram::{extract_diagram_metadata, ExtractedTable};
use crate::enrich::GenAiManager;
use crate::ingest::{IngestError, IngestSummary};
use crate::store::catalog;
use crate::store::models::{NewColumnRecord, NewTableRecord};
use duckdb::Connection;
use tracing::info;

const SOURCE_LABEL: &str = "Image Diagram";
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// Splits a PDF into standalone single-page documents so each page can be
/// forwarded to the extraction boundary independently.
pub fn split_pdf_pages(data: &[u8]) -> Result<Vec<Vec<u8>>, IngestError> {
    let document = lopdf::Document::load_mem(data)
        .map_err(|e| IngestError::ParsingError(format!("Unreadable PDF: {}", e)))?;

    let page_count = document.get_pages().len() as u32;
    if page_count <= 1 {
        return Ok(vec![data.to_vec()]);
    }

    let mut pages = Vec::with_capacity(page_count as usize);
    for page_number in 1..=page_count {
        let mut single = document.clone();
        let others: Vec<u32> = (1..=page_count).filter(|p| *p != page_number).collect();
        single.delete_pages(&others);

        let mut buffer = Vec::new();
        single
            .save_to(&mut buffer)
            .map_err(|e| IngestError::ParsingError(format!("Failed to split PDF: {}", e)))?;
        pages.push(buffer);
    }

    Ok(pages)
}

/// Runs the extraction boundary over the artifact: once for a plain image,
/// once per page for a PDF, merging the extracted tables across pages.
pub async fn collect_extractions(
    ai: &GenAiManager,
    data: &[u8],
    content_type: &str,
) -> Result<Vec<ExtractedTable>, IngestError> {
    if content_type == "application/pdf" {
        let pages = split_pdf_pages(data)?;
        info!("Forwarding {} PDF page(s) for diagram extraction", pages.len());

        let mut tables = Vec::new();
        for page in &pages {
            let extraction = extract_diagram_metadata(ai, page, "application/pdf").await;
            tables.extend(extraction.tables);
        }
        Ok(tables)
    } else {
        Ok(extract_diagram_metadata(ai, data, content_type).await.tables)
    }
}

/// Persists the merged extraction result. Zero extracted tables fails the
/// whole request before any row is written.
pub fn ingest(conn: &mut Connection, tables: &[ExtractedTable]) -> Result<IngestSummary, IngestError> {
    if tables.is_empty() {
        return Err(IngestError::ExtractionError(
            "Failed to extract any table metadata from the diagram".to_string(),
        ));
    }

    let mut summary = IngestSummary::default();
    let tx = conn.transaction()?;
    for table in tables {
        let table_id = catalog::insert_table(
            &tx,
            &NewTableRecord {
                table_name: table.table_name.clone(),
                schema_name: table
                    .schema_name
                    .clone()
                    .unwrap_or_else(|| "public".to_string()),
                source: Some(SOURCE_LABEL.to_string()),
            },
        )?;
        summary.tables += 1;

        for column in &table.columns {
            catalog::insert_column(
                &tx,
                &NewColumnRecord {
                    table_id,
                    column_name: column.column_name.clone(),
                    data_type: Some(
                        column
                            .data_type
                            .clone()
                            .unwrap_or_else(|| "UNKNOWN".to_string()),
                    ),
                    description: None,
                },
            )?;
            summary.columns += 1;
        }
    }
    tx.commit()?;

    Ok(summary)
}
