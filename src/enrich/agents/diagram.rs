use crate::enrich::{strip_code_fences, GenAiManager, MediaPart};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Structured metadata extracted from one diagram page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramExtraction {
    #[serde(default)]
    pub tables: Vec<ExtractedTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<ExtractedColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedColumn {
    pub column_name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

const DIAGRAM_PROMPT: &str = r#"
You are an expert at reading data model diagrams. Analyze the provided image and
extract the table names, schema names, and the columns within each table.
For each column, identify its name and data type if possible.
Respond with a single JSON object that contains a list of tables.
Each table should be an object with 'table_name', 'schema_name', and a list of 'columns'.
Each column should have 'column_name' and 'data_type'.
Example JSON format:
{
  "tables": [
    {
      "table_name": "users",
      "schema_name": "public",
      "columns": [
        {"column_name": "user_id", "data_type": "int"},
        {"column_name": "user_name", "data_type": "varchar"}
      ]
    }
  ]
}
"#;

fn mock_extraction() -> DiagramExtraction {
    DiagramExtraction {
        tables: vec![ExtractedTable {
            table_name: "mock_users".to_string(),
            schema_name: Some("public".to_string()),
            columns: vec![
                ExtractedColumn {
                    column_name: "user_id".to_string(),
                    data_type: Some("int".to_string()),
                },
                ExtractedColumn {
                    column_name: "username".to_string(),
                    data_type: Some("varchar".to_string()),
                },
            ],
        }],
    }
}

/// Extracts table/column metadata from one diagram image or PDF page.
/// A backend failure or unparsable response yields an empty table list.
pub async fn extract_diagram_metadata(
    ai: &GenAiManager,
    data: &[u8],
    mime_type: &str,
) -> DiagramExtraction {
    if !ai.is_configured() {
        return mock_extraction();
    }

    let media = MediaPart { mime_type, data };
    match ai.generate(DIAGRAM_PROMPT, Some(media)).await {
        Ok(text) => match serde_json::from_str(strip_code_fences(&text)) {
            Ok(extraction) => extraction,
            Err(e) => {
                error!("Diagram extraction returned a non-JSON response: {}", e);
                DiagramExtraction { tables: Vec::new() }
            }
        },
        Err(e) => {
            error!("Error processing diagram with generation API: {}", e);
            DiagramExtraction { tables: Vec::new() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::agents::fixtures;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unconfigured_backend_yields_the_sample_table() {
        let ai = fixtures::mock();
        let extraction = extract_diagram_metadata(&ai, b"bytes", "image/png").await;
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].table_name, "mock_users");
        assert_eq!(extraction.tables[0].columns.len(), 2);
    }

    #[tokio::test]
    async fn fenced_json_responses_parse() {
        let ai = fixtures::canned(
            "```json\n{\"tables\": [{\"table_name\": \"users\", \"schema_name\": \"app\", \
             \"columns\": [{\"column_name\": \"id\", \"data_type\": \"INT\"}]}]}\n```",
        );
        let extraction = extract_diagram_metadata(&ai, b"bytes", "image/png").await;
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].schema_name.as_deref(), Some("app"));
    }

    #[tokio::test]
    async fn non_json_responses_yield_no_tables() {
        let ai = fixtures::canned("I could not read the diagram, sorry.");
        let extraction = extract_diagram_metadata(&ai, b"bytes", "image/png").await;
        assert_eq!(extraction.tables, Vec::new());
    }

    #[tokio::test]
    async fn service_failure_yields_no_tables() {
        let ai = fixtures::failing();
        let extraction = extract_diagram_metadata(&ai, b"bytes", "application/pdf").await;
        assert_eq!(extraction.tables, Vec::new());
    }
}
