use crate::enrich::{strip_code_fences, GenAiManager};
use serde::{Deserialize, Serialize};
use tracing::error;

/// One lineage relationship extracted from code: the named source tables
/// feed the target table through the described transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageExtraction {
    #[serde(default)]
    pub source_tables: Vec<String>,
    pub target_table: String,
    #[serde(default)]
    pub transformation_logic: Option<String>,
}

fn build_prompt(code: &str, code_type: &str) -> String {
    format!(
        r#"
You are a data lineage expert. Analyze the following {} code and
identify the data lineage. For each query or transformation, identify the
source tables and the target table (if one is being created or updated).
Also, provide a brief description of the transformation logic.
Respond with a JSON array of objects. Each object should have 'source_tables' (an array of strings),
'target_table' (a string), and 'transformation_logic' (a string).
If a target table cannot be identified, omit the object.

Code:
```
{}
```

JSON Output:
"#,
        code_type, code
    )
}

fn mock_extractions() -> Vec<LineageExtraction> {
    vec![LineageExtraction {
        source_tables: vec!["mock_source_table".to_string()],
        target_table: "mock_target_table".to_string(),
        transformation_logic: Some("Mock transformation".to_string()),
    }]
}

/// Extracts lineage records from SQL or PySpark code. A backend failure or
/// unparsable response yields an empty list.
pub async fn extract_lineage(
    ai: &GenAiManager,
    code: &str,
    code_type: &str,
) -> Vec<LineageExtraction> {
    if !ai.is_configured() {
        return mock_extractions();
    }

    match ai.generate(&build_prompt(code, code_type), None).await {
        Ok(text) => match serde_json::from_str(strip_code_fences(&text)) {
            Ok(extractions) => extractions,
            Err(e) => {
                error!("Lineage extraction returned a non-JSON response: {}", e);
                Vec::new()
            }
        },
        Err(e) => {
            error!("Error extracting lineage with generation API: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::agents::fixtures;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unconfigured_backend_yields_the_sample_edge() {
        let ai = fixtures::mock();
        let extractions = extract_lineage(&ai, "SELECT 1", "sql").await;
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].target_table, "mock_target_table");
        assert_eq!(extractions[0].source_tables, vec!["mock_source_table"]);
    }

    #[tokio::test]
    async fn json_array_responses_parse() {
        let ai = fixtures::canned(
            "```json\n[{\"source_tables\": [\"orders\", \"customers\"], \
             \"target_table\": \"order_summary\", \"transformation_logic\": \"join and aggregate\"}]\n```",
        );
        let extractions = extract_lineage(&ai, "INSERT INTO order_summary ...", "sql").await;
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].source_tables.len(), 2);
        assert_eq!(
            extractions[0].transformation_logic.as_deref(),
            Some("join and aggregate")
        );
    }

    #[tokio::test]
    async fn unparsable_responses_yield_no_records() {
        let ai = fixtures::canned("no lineage here");
        assert_eq!(extract_lineage(&ai, "x = 1", "pyspark_sql").await, Vec::new());
    }

    #[tokio::test]
    async fn service_failure_yields_no_records() {
        let ai = fixtures::failing();
        assert_eq!(extract_lineage(&ai, "SELECT 1", "sql").await, Vec::new());
    }
}
