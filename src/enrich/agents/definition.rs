use crate::enrich::agents::column_context;
use crate::enrich::GenAiManager;
use crate::store::models::{ColumnRecord, TableRecord};
use tracing::error;

const MOCK_DEFINITION: &str = "Mock business definition for the table.";
const FALLBACK_DEFINITION: &str = "Could not generate business definition.";

fn build_prompt(table: &TableRecord, columns: &[ColumnRecord]) -> String {
    format!(
        r#"
You are an expert data analyst. Based on the following table schema and column descriptions,
provide a concise and clear business definition for the table. The definition should be 1-2 sentences.

Table Name: {}
Schema: {}

Columns:
{}

Business Definition:
"#,
        table.table_name,
        table.schema_name,
        column_context(columns)
    )
}

/// Produces a 1-2 sentence business definition for a table. The caller is
/// responsible for writing the returned value back to the catalog.
pub async fn generate_business_definition(
    ai: &GenAiManager,
    table: &TableRecord,
    columns: &[ColumnRecord],
) -> String {
    if !ai.is_configured() {
        return MOCK_DEFINITION.to_string();
    }

    match ai.generate(&build_prompt(table, columns), None).await {
        Ok(text) => {
            let definition = text.trim();
            if definition.is_empty() {
                FALLBACK_DEFINITION.to_string()
            } else {
                definition.to_string()
            }
        }
        Err(e) => {
            error!("Error generating definition: {}", e);
            FALLBACK_DEFINITION.to_string()
        }
    }
}
