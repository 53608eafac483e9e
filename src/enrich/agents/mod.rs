//! Enrichment agents. Each one derives exactly one attribute for a cataloged
//! table (or raw artifact) by prompting the generation boundary, and never
//! touches the store itself. Every agent has a deterministic mock value for
//! when no backend is configured, and a typed fallback for responses that
//! fail to parse, so agent calls never surface an error to the caller.

pub mod definition;
pub mod diagram;
pub mod lineage;
pub mod quality;
pub mod tags;

use crate::store::models::ColumnRecord;

/// Renders the column list as indented JSON for embedding in prompts.
pub(crate) fn column_context(columns: &[ColumnRecord]) -> String {
    let entries: Vec<serde_json::Value> = columns
        .iter()
        .map(|col| {
            serde_json::json!({
                "name": col.column_name,
                "data_type": col.data_type,
                "description": col.description,
            })
        })
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::enrich::{GenAiError, MediaPart, TextGenerator};
    use async_trait::async_trait;

    /// Fixture backend returning one canned response, for driving the
    /// parsed-response paths in tests.
    pub struct CannedGenerator(pub String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _media: Option<MediaPart<'_>>,
        ) -> Result<String, GenAiError> {
            Ok(self.0.clone())
        }
    }

    /// Fixture backend that always fails, for driving the error paths.
    pub struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _media: Option<MediaPart<'_>>,
        ) -> Result<String, GenAiError> {
            Err(GenAiError::ConnectionError("unreachable".to_string()))
        }
    }

    pub fn canned(text: &str) -> crate::enrich::GenAiManager {
        crate::enrich::GenAiManager::with_generator(Box::new(CannedGenerator(text.to_string())))
    }

    pub fn failing() -> crate::enrich::GenAiManager {
        crate::enrich::GenAiManager::with_generator(Box::new(FailingGenerator))
    }

    pub fn mock() -> crate::enrich::GenAiManager {
        let config = crate::config::AiConfig {
            backend: "mock".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            api_url: None,
            temperature: 0.7,
            max_output_tokens: 100,
        };
        crate::enrich::GenAiManager::new(&config).unwrap()
    }

    pub fn table(schema_name: &str, table_name: &str) -> crate::store::models::TableRecord {
        crate::store::models::TableRecord {
            id: 1,
            table_name: table_name.to_string(),
            schema_name: schema_name.to_string(),
            source: None,
            business_definition: None,
            data_quality_score: None,
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}
