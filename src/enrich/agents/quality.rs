use crate::enrich::agents::column_context;
use crate::enrich::{strip_code_fences, GenAiManager};
use crate::store::models::{ColumnRecord, TableRecord};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::error;

fn build_prompt(table: &TableRecord, columns: &[ColumnRecord]) -> String {
    format!(
        r#"
You are an expert data quality analyst. Based on the following table and column metadata,
provide a data quality score from 0-100. Consider factors like completeness (e.g., nullable fields),
consistency, and descriptive column names. Provide only the integer score, nothing else.

Table Name: {}
Schema: {}

Columns:
{}

Data Quality Score (0-100):
"#,
        table.table_name,
        table.schema_name,
        column_context(columns)
    )
}

/// Mock score: the schema and table name hashed into [50, 100], so it varies
/// across tables but is stable across runs.
fn mock_score(table: &TableRecord) -> i32 {
    let mut hasher = DefaultHasher::new();
    table.schema_name.hash(&mut hasher);
    table.table_name.hash(&mut hasher);
    50 + (hasher.finish() % 51) as i32
}

/// A non-numeric response scores 0; numeric responses are clamped to [0, 100].
fn parse_score(text: &str) -> i32 {
    strip_code_fences(text)
        .trim()
        .parse::<i64>()
        .map(|score| score.clamp(0, 100) as i32)
        .unwrap_or(0)
}

/// Scores the table's data quality as an integer in [0, 100]. Never fails:
/// unreachable or unparsable backends degrade to the mock or zero score.
pub async fn score_data_quality(
    ai: &GenAiManager,
    table: &TableRecord,
    columns: &[ColumnRecord],
) -> i32 {
    if !ai.is_configured() {
        return mock_score(table);
    }

    match ai.generate(&build_prompt(table, columns), None).await {
        Ok(text) => parse_score(&text),
        Err(e) => {
            error!("Error calculating data quality: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::agents::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_responses_parse_and_clamp() {
        assert_eq!(parse_score("85"), 85);
        assert_eq!(parse_score(" 92 \n"), 92);
        assert_eq!(parse_score("150"), 100);
        assert_eq!(parse_score("-3"), 0);
        assert_eq!(parse_score("```\n70\n```"), 70);
    }

    #[test]
    fn non_numeric_responses_score_zero() {
        assert_eq!(parse_score("the score is 85"), 0);
        assert_eq!(parse_score(""), 0);
    }

    #[tokio::test]
    async fn mock_score_is_deterministic_and_in_range() {
        let ai = fixtures::mock();
        let table = fixtures::table("finance", "orders");
        let first = score_data_quality(&ai, &table, &[]).await;
        let second = score_data_quality(&ai, &table, &[]).await;
        assert_eq!(first, second);
        assert!((50..=100).contains(&first));

        let other = fixtures::table("finance", "refunds");
        let other_score = score_data_quality(&ai, &other, &[]).await;
        assert!((50..=100).contains(&other_score));
    }

    #[tokio::test]
    async fn service_failure_scores_zero() {
        let ai = fixtures::failing();
        let table = fixtures::table("public", "orders");
        assert_eq!(score_data_quality(&ai, &table, &[]).await, 0);
    }

    #[tokio::test]
    async fn parsed_path_stays_in_range() {
        let ai = fixtures::canned("300");
        let table = fixtures::table("public", "orders");
        assert_eq!(score_data_quality(&ai, &table, &[]).await, 100);
    }
}
