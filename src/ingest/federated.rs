use crate::ingest::{IngestError, IngestSummary};
use crate::store::catalog;
use crate::store::models::{NewColumnRecord, NewTableRecord};
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog/schema/table/column listing returned by the query-federation
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedCatalog {
    pub catalog: String,
    pub schema: String,
    pub tables: Vec<FederatedTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedTable {
    pub name: String,
    pub columns: Vec<FederatedColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Connector to a query-federation backend. One implementation per real
/// backend, plus a deterministic fixture for tests and unwired deployments.
pub trait FederationClient: Send + Sync {
    fn fetch_catalog(&self, options: &HashMap<String, String>)
        -> Result<FederatedCatalog, IngestError>;
}

/// Deterministic fixture listing standing in for a live coordinator.
pub struct FixtureFederationClient;

impl FederationClient for FixtureFederationClient {
    fn fetch_catalog(
        &self,
        _options: &HashMap<String, String>,
    ) -> Result<FederatedCatalog, IngestError> {
        Ok(FederatedCatalog {
            catalog: "mock_starburst_catalog".to_string(),
            schema: "finance".to_string(),
            tables: vec![
                FederatedTable {
                    name: "sales".to_string(),
                    columns: vec![
                        FederatedColumn {
                            name: "order_id".to_string(),
                            data_type: "bigint".to_string(),
                            comment: Some("Unique order identifier".to_string()),
                        },
                        FederatedColumn {
                            name: "sale_date".to_string(),
                            data_type: "date".to_string(),
                            comment: Some("Date of sale".to_string()),
                        },
                    ],
                },
                FederatedTable {
                    name: "customers".to_string(),
                    columns: vec![
                        FederatedColumn {
                            name: "customer_id".to_string(),
                            data_type: "bigint".to_string(),
                            comment: Some("Unique customer identifier".to_string()),
                        },
                        FederatedColumn {
                            name: "customer_name".to_string(),
                            data_type: "varchar".to_string(),
                            comment: Some("Name of the customer".to_string()),
                        },
                    ],
                },
            ],
        })
    }
}

/// Maps a federated listing 1:1 onto catalog rows in one transaction.
pub fn ingest(
    conn: &mut Connection,
    listing: &FederatedCatalog,
) -> Result<IngestSummary, IngestError> {
    let source = format!("Starburst: {}", listing.catalog);

    let mut summary = IngestSummary::default();
    let tx = conn.transaction()?;
    for table in &listing.tables {
        let table_id = catalog::insert_table(
            &tx,
            &NewTableRecord {
                table_name: table.name.clone(),
                schema_name: listing.schema.clone(),
                source: Some(source.clone()),
            },
        )?;
        summary.tables += 1;

        for column in &table.columns {
            catalog::insert_column(
                &tx,
                &NewColumnRecord {
                    table_id,
                    column_name: column.name.clone(),
                    data_type: Some(column.data_type.clone()),
                    description: column.comment.clone(),
                },
            )?;
            summary.columns += 1;
        }
    }
    tx.commit()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixture_listing_maps_onto_catalog_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();

        let listing = FixtureFederationClient
            .fetch_catalog(&HashMap::new())
            .unwrap();
        let summary = ingest(&mut conn, &listing).unwrap();
        assert_eq!(summary, IngestSummary { tables: 2, columns: 4 });

        let sales = catalog::find_table(&conn, "finance", "sales").unwrap().unwrap();
        assert_eq!(sales.source.as_deref(), Some("Starburst: mock_starburst_catalog"));

        let columns = catalog::columns_for_table(&conn, sales.id).unwrap();
        assert_eq!(columns[0].column_name, "order_id");
        assert_eq!(columns[0].description.as_deref(), Some("Unique order identifier"));
    }
}
