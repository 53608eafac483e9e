use crate::enrich::agents::lineage::LineageExtraction;
use crate::ingest::IngestError;
use crate::store::catalog;
use duckdb::Connection;
use tracing::debug;

/// Code types the lineage extraction boundary understands.
pub const CODE_TYPES: [&str; 2] = ["sql", "pyspark_sql"];

/// Upload extension expected for each code type.
pub fn extension_for(code_type: &str) -> Option<&'static str> {
    match code_type {
        "sql" => Some(".sql"),
        "pyspark_sql" => Some(".py"),
        _ => None,
    }
}

/// Resolves extracted lineage records against the catalog by exact table
/// name and stores one edge per matched (source, target) pair, all in one
/// transaction. Records whose target is not cataloged, and source names with
/// no catalog match, are silently dropped. Returns the number of edges
/// created.
pub fn ingest(
    conn: &mut Connection,
    extractions: &[LineageExtraction],
) -> Result<usize, IngestError> {
    let mut edge_count = 0;
    let tx = conn.transaction()?;
    for extraction in extractions {
        let Some(target) = catalog::find_table_by_name(&tx, &extraction.target_table)? else {
            debug!(
                "Dropping lineage record: target table '{}' is not cataloged",
                extraction.target_table
            );
            continue;
        };

        for source_name in &extraction.source_tables {
            let Some(source) = catalog::find_table_by_name(&tx, source_name)? else {
                debug!("Dropping lineage source '{}': not cataloged", source_name);
                continue;
            };

            catalog::insert_lineage(
                &tx,
                source.id,
                target.id,
                extraction
                    .transformation_logic
                    .as_deref()
                    .unwrap_or("Unknown"),
            )?;
            edge_count += 1;
        }
    }
    tx.commit()?;

    Ok(edge_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::NewTableRecord;
    use crate::store::schema;
    use pretty_assertions::assert_eq;

    fn seed(conn: &Connection, name: &str) -> i64 {
        catalog::insert_table(
            conn,
            &NewTableRecord {
                table_name: name.to_string(),
                schema_name: "public".to_string(),
                source: None,
            },
        )
        .unwrap()
    }

    fn extraction(sources: &[&str], target: &str) -> LineageExtraction {
        LineageExtraction {
            source_tables: sources.iter().map(|s| s.to_string()).collect(),
            target_table: target.to_string(),
            transformation_logic: Some("x".to_string()),
        }
    }

    #[test]
    fn matched_pairs_become_edges() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();
        let a = seed(&conn, "a");
        seed(&conn, "b");

        let edges = ingest(&mut conn, &[extraction(&["a"], "b")]).unwrap();
        assert_eq!(edges, 1);
        assert_eq!(catalog::downstream_table_names(&conn, a).unwrap(), vec!["b"]);
    }

    #[test]
    fn missing_target_creates_no_edges() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();
        seed(&conn, "a");

        let edges = ingest(&mut conn, &[extraction(&["a"], "b")]).unwrap();
        assert_eq!(edges, 0);
        assert_eq!(catalog::counts(&conn).unwrap().lineage_edges, 0);
    }

    #[test]
    fn unmatched_sources_are_dropped_matched_ones_kept() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();
        seed(&conn, "a");
        let b = seed(&conn, "b");

        let edges = ingest(&mut conn, &[extraction(&["a", "ghost"], "b")]).unwrap();
        assert_eq!(edges, 1);
        assert_eq!(catalog::upstream_table_names(&conn, b).unwrap(), vec!["a"]);
    }

    #[test]
    fn code_type_extensions_are_fixed() {
        assert_eq!(extension_for("sql"), Some(".sql"));
        assert_eq!(extension_for("pyspark_sql"), Some(".py"));
        assert_eq!(extension_for("scala"), None);
    }
}
