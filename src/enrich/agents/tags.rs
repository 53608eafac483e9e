use crate::enrich::agents::column_context;
use crate::enrich::{strip_code_fences, GenAiManager};
use crate::store::models::{ColumnRecord, TableRecord};
use regex::Regex;
use tracing::error;

const MAX_TAGS: usize = 5;

fn build_prompt(table: &TableRecord, columns: &[ColumnRecord]) -> String {
    format!(
        r#"
You are a data cataloging specialist. Based on the following table schema and column descriptions,
provide a comma-separated list of up to 5 relevant tags. The tags should be in snake_case.
Do not include any other text, just the tags.

Table Name: {}
Schema: {}

Columns:
{}

Tags:
"#,
        table.table_name,
        table.schema_name,
        column_context(columns)
    )
}

/// Normalizes one raw tag to lowercase snake_case.
fn sanitize_tag(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut tag: String = lowered
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    while tag.contains("__") {
        tag = tag.replace("__", "_");
    }
    tag.trim_matches('_').to_string()
}

fn parse_tags(text: &str) -> Vec<String> {
    let separator = Regex::new(r",\s*").unwrap();
    separator
        .split(strip_code_fences(text))
        .map(sanitize_tag)
        .filter(|tag| !tag.is_empty())
        .take(MAX_TAGS)
        .collect()
}

/// Produces up to 5 lowercase snake_case tags for a table; an unreachable
/// backend yields an empty list rather than an error.
pub async fn generate_tags(
    ai: &GenAiManager,
    table: &TableRecord,
    columns: &[ColumnRecord],
) -> Vec<String> {
    if !ai.is_configured() {
        return vec!["mock_tag".to_string(), "example_data".to_string()];
    }

    match ai.generate(&build_prompt(table, columns), None).await {
        Ok(text) => parse_tags(&text),
        Err(e) => {
            error!("Error generating tags: {}", e);
            Vec::new()
        }
    }
}
