use serde::Serialize;
use tracing::warn;

/// One cataloged relational table. Tags are stored as a JSON-encoded string
/// list in the `tags` column and decoded on read.
#[derive(Debug, Clone, Serialize)]
pub struct TableRecord {
    pub id: i64,
    pub table_name: String,
    pub schema_name: String,
    pub source: Option<String>,
    pub business_definition: Option<String>,
    pub data_quality_score: Option<i32>,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTableRecord {
    pub table_name: String,
    pub schema_name: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnRecord {
    pub id: i64,
    pub table_id: i64,
    pub column_name: String,
    pub data_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewColumnRecord {
    pub table_id: i64,
    pub column_name: String,
    pub data_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub table_id: i64,
    pub column_id: Option<i64>,
    pub feedback_text: String,
    pub status: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFeedbackRecord {
    pub table_id: i64,
    pub column_id: Option<i64>,
    pub feedback_text: String,
}

pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_tags(raw: Option<String>) -> Vec<String> {
    match raw {
        Some(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Discarding undecodable tag list {:?}: {}", text, e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_round_trip_through_json_text() {
        let tags = vec!["finance".to_string(), "orders".to_string()];
        assert_eq!(decode_tags(Some(encode_tags(&tags))), tags);
    }

    #[test]
    fn missing_or_garbled_tags_decode_to_empty() {
        assert_eq!(decode_tags(None), Vec::<String>::new());
        assert_eq!(decode_tags(Some("not json".to_string())), Vec::<String>::new());
    }
}
