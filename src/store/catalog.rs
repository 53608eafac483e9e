//! Catalog store access: every function takes a live connection and returns
//! the driver error unwrapped, so callers decide transaction boundaries.
//! Write endpoints wrap a batch of these calls in one transaction.

use duckdb::{params, Connection};

use crate::store::models::{
    self, ColumnRecord, FeedbackRecord, NewColumnRecord, NewFeedbackRecord, NewTableRecord,
    TableRecord,
};

const TABLE_COLUMNS: &str = "id, table_name, schema_name, source, business_definition, \
     data_quality_score, tags, CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR)";

fn row_to_table(row: &duckdb::Row<'_>) -> Result<TableRecord, duckdb::Error> {
    Ok(TableRecord {
        id: row.get(0)?,
        table_name: row.get(1)?,
        schema_name: row.get(2)?,
        source: row.get(3)?,
        business_definition: row.get(4)?,
        data_quality_score: row.get(5)?,
        tags: models::decode_tags(row.get(6)?),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_column(row: &duckdb::Row<'_>) -> Result<ColumnRecord, duckdb::Error> {
    Ok(ColumnRecord {
        id: row.get(0)?,
        table_id: row.get(1)?,
        column_name: row.get(2)?,
        data_type: row.get(3)?,
        description: row.get(4)?,
    })
}

fn row_to_feedback(row: &duckdb::Row<'_>) -> Result<FeedbackRecord, duckdb::Error> {
    Ok(FeedbackRecord {
        id: row.get(0)?,
        table_id: row.get(1)?,
        column_id: row.get(2)?,
        feedback_text: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Inserts a table row. Re-ingesting a known (schema, table) pair inserts a
/// second independent row; the catalog has no uniqueness invariant.
pub fn insert_table(conn: &Connection, new: &NewTableRecord) -> Result<i64, duckdb::Error> {
    conn.query_row(
        "INSERT INTO table_metadata (table_name, schema_name, source) VALUES (?, ?, ?) RETURNING id",
        params![new.table_name, new.schema_name, new.source],
        |row| row.get(0),
    )
}

pub fn insert_column(conn: &Connection, new: &NewColumnRecord) -> Result<i64, duckdb::Error> {
    conn.query_row(
        "INSERT INTO column_metadata (table_id, column_name, data_type, description) \
         VALUES (?, ?, ?, ?) RETURNING id",
        params![new.table_id, new.column_name, new.data_type, new.description],
        |row| row.get(0),
    )
}

pub fn insert_lineage(
    conn: &Connection,
    source_table_id: i64,
    target_table_id: i64,
    transformation_logic: &str,
) -> Result<i64, duckdb::Error> {
    conn.query_row(
        "INSERT INTO lineage_metadata (source_table_id, target_table_id, transformation_logic) \
         VALUES (?, ?, ?) RETURNING id",
        params![source_table_id, target_table_id, transformation_logic],
        |row| row.get(0),
    )
}

/// Finds the oldest table row for a (schema, table) pair.
pub fn find_table(
    conn: &Connection,
    schema_name: &str,
    table_name: &str,
) -> Result<Option<TableRecord>, duckdb::Error> {
    let sql = format!(
        "SELECT {TABLE_COLUMNS} FROM table_metadata \
         WHERE schema_name = ? AND table_name = ? ORDER BY id LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![schema_name, table_name], row_to_table)?;
    rows.next().transpose()
}

/// Finds a table by bare name across all schemas; used by the lineage-code
/// adapter, which resolves names by exact match.
pub fn find_table_by_name(
    conn: &Connection,
    table_name: &str,
) -> Result<Option<TableRecord>, duckdb::Error> {
    let sql = format!(
        "SELECT {TABLE_COLUMNS} FROM table_metadata WHERE table_name = ? ORDER BY id LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![table_name], row_to_table)?;
    rows.next().transpose()
}

pub fn get_table(conn: &Connection, table_id: i64) -> Result<Option<TableRecord>, duckdb::Error> {
    let sql = format!("SELECT {TABLE_COLUMNS} FROM table_metadata WHERE id = ?");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![table_id], row_to_table)?;
    rows.next().transpose()
}

pub fn get_column(conn: &Connection, column_id: i64) -> Result<Option<ColumnRecord>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, column_name, data_type, description \
         FROM column_metadata WHERE id = ?",
    )?;
    let mut rows = stmt.query_map(params![column_id], row_to_column)?;
    rows.next().transpose()
}

/// Lists tables, optionally filtered by a case-insensitive substring match on
/// table or schema name.
pub fn list_tables(
    conn: &Connection,
    search: Option<&str>,
) -> Result<Vec<TableRecord>, duckdb::Error> {
    match search {
        Some(term) => {
            let sql = format!(
                "SELECT {TABLE_COLUMNS} FROM table_metadata \
                 WHERE table_name ILIKE '%' || ? || '%' OR schema_name ILIKE '%' || ? || '%' \
                 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![term, term], row_to_table)?;
            rows.collect()
        }
        None => {
            let sql = format!("SELECT {TABLE_COLUMNS} FROM table_metadata ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_table)?;
            rows.collect()
        }
    }
}

pub fn columns_for_table(
    conn: &Connection,
    table_id: i64,
) -> Result<Vec<ColumnRecord>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, column_name, data_type, description \
         FROM column_metadata WHERE table_id = ? ORDER BY id",
    )?;
    let rows = stmt.query_map(params![table_id], row_to_column)?;
    rows.collect()
}

/// Deletes a table and everything referencing it: columns, lineage edges on
/// either end, and feedback rows. Callers wrap this in a transaction.
/// Returns whether the table existed.
pub fn delete_table(conn: &Connection, table_id: i64) -> Result<bool, duckdb::Error> {
    conn.execute("DELETE FROM user_feedback WHERE table_id = ?", params![table_id])?;
    conn.execute(
        "DELETE FROM lineage_metadata WHERE source_table_id = ? OR target_table_id = ?",
        params![table_id, table_id],
    )?;
    conn.execute("DELETE FROM column_metadata WHERE table_id = ?", params![table_id])?;
    let deleted = conn.execute("DELETE FROM table_metadata WHERE id = ?", params![table_id])?;
    Ok(deleted > 0)
}

/// Names of tables one hop upstream: sources of edges targeting this table.
pub fn upstream_table_names(conn: &Connection, table_id: i64) -> Result<Vec<String>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT t.table_name FROM lineage_metadata l \
         JOIN table_metadata t ON t.id = l.source_table_id \
         WHERE l.target_table_id = ? ORDER BY t.table_name",
    )?;
    let rows = stmt.query_map(params![table_id], |row| row.get(0))?;
    rows.collect()
}

/// Names of tables one hop downstream: targets of edges sourced from this table.
pub fn downstream_table_names(
    conn: &Connection,
    table_id: i64,
) -> Result<Vec<String>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT t.table_name FROM lineage_metadata l \
         JOIN table_metadata t ON t.id = l.target_table_id \
         WHERE l.source_table_id = ? ORDER BY t.table_name",
    )?;
    let rows = stmt.query_map(params![table_id], |row| row.get(0))?;
    rows.collect()
}

pub fn set_business_definition(
    conn: &Connection,
    table_id: i64,
    definition: &str,
) -> Result<(), duckdb::Error> {
    conn.execute(
        "UPDATE table_metadata SET business_definition = ?, updated_at = current_timestamp \
         WHERE id = ?",
        params![definition, table_id],
    )?;
    Ok(())
}

pub fn set_quality_score(conn: &Connection, table_id: i64, score: i32) -> Result<(), duckdb::Error> {
    conn.execute(
        "UPDATE table_metadata SET data_quality_score = ?, updated_at = current_timestamp \
         WHERE id = ?",
        params![score, table_id],
    )?;
    Ok(())
}

pub fn set_tags(conn: &Connection, table_id: i64, tags: &[String]) -> Result<(), duckdb::Error> {
    conn.execute(
        "UPDATE table_metadata SET tags = ?, updated_at = current_timestamp WHERE id = ?",
        params![models::encode_tags(tags), table_id],
    )?;
    Ok(())
}

pub fn insert_feedback(
    conn: &Connection,
    new: &NewFeedbackRecord,
) -> Result<FeedbackRecord, duckdb::Error> {
    conn.query_row(
        "INSERT INTO user_feedback (table_id, column_id, feedback_text) VALUES (?, ?, ?) \
         RETURNING id, table_id, column_id, feedback_text, status, CAST(created_at AS VARCHAR)",
        params![new.table_id, new.column_id, new.feedback_text],
        |row| row_to_feedback(row),
    )
}

pub fn list_feedback(conn: &Connection) -> Result<Vec<FeedbackRecord>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, column_id, feedback_text, status, CAST(created_at AS VARCHAR) \
         FROM user_feedback ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_feedback)?;
    rows.collect()
}

/// Distinct schema names with their table counts; the read API presents
/// schemas as browsing domains.
pub fn list_schemas(conn: &Connection) -> Result<Vec<(String, i64)>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT schema_name, COUNT(*) FROM table_metadata GROUP BY schema_name ORDER BY schema_name",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn tables_in_schema(
    conn: &Connection,
    schema_name: &str,
) -> Result<Vec<TableRecord>, duckdb::Error> {
    let sql = format!(
        "SELECT {TABLE_COLUMNS} FROM table_metadata WHERE schema_name = ? ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![schema_name], row_to_table)?;
    rows.collect()
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogCounts {
    pub tables: i64,
    pub columns: i64,
    pub lineage_edges: i64,
    pub feedback_entries: i64,
}

pub fn counts(conn: &Connection) -> Result<CatalogCounts, duckdb::Error> {
    let count = |sql: &str| conn.query_row(sql, [], |row| row.get::<_, i64>(0));
    Ok(CatalogCounts {
        tables: count("SELECT COUNT(*) FROM table_metadata")?,
        columns: count("SELECT COUNT(*) FROM column_metadata")?,
        lineage_edges: count("SELECT COUNT(*) FROM lineage_metadata")?,
        feedback_entries: count("SELECT COUNT(*) FROM user_feedback")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema;
    use duckdb::Connection;
    use pretty_assertions::assert_eq;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();
        conn
    }

    fn seed_table(conn: &Connection, schema_name: &str, table_name: &str) -> i64 {
        insert_table(
            conn,
            &NewTableRecord {
                table_name: table_name.to_string(),
                schema_name: schema_name.to_string(),
                source: Some("test".to_string()),
            },
        )
        .unwrap()
    }

    #[test]
    fn insert_and_find_round_trip() {
        let conn = test_conn();
        let id = seed_table(&conn, "finance", "orders");
        insert_column(
            &conn,
            &NewColumnRecord {
                table_id: id,
                column_name: "order_id".to_string(),
                data_type: Some("BIGINT".to_string()),
                description: None,
            },
        )
        .unwrap();

        let table = find_table(&conn, "finance", "orders").unwrap().unwrap();
        assert_eq!(table.id, id);
        assert_eq!(table.source.as_deref(), Some("test"));
        assert!(table.created_at.is_some());
        assert_eq!(table.updated_at, None);

        let columns = columns_for_table(&conn, id).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].column_name, "order_id");
        assert_eq!(columns[0].data_type.as_deref(), Some("BIGINT"));
    }

    #[test]
    fn reingesting_a_known_table_inserts_a_duplicate_row() {
        let conn = test_conn();
        let first = seed_table(&conn, "public", "sales");
        let second = seed_table(&conn, "public", "sales");
        assert_ne!(first, second);

        let all = list_tables(&conn, None).unwrap();
        assert_eq!(all.len(), 2);
        // find_table resolves to the oldest row
        let found = find_table(&conn, "public", "sales").unwrap().unwrap();
        assert_eq!(found.id, first);
    }

    #[test]
    fn delete_table_cascades_to_columns_lineage_and_feedback() {
        let conn = test_conn();
        let a = seed_table(&conn, "public", "a");
        let b = seed_table(&conn, "public", "b");
        for name in ["x", "y"] {
            insert_column(
                &conn,
                &NewColumnRecord {
                    table_id: a,
                    column_name: name.to_string(),
                    data_type: None,
                    description: None,
                },
            )
            .unwrap();
        }
        insert_lineage(&conn, a, b, "select *").unwrap();
        insert_lineage(&conn, b, a, "select *").unwrap();
        insert_feedback(
            &conn,
            &NewFeedbackRecord {
                table_id: a,
                column_id: None,
                feedback_text: "wrong definition".to_string(),
            },
        )
        .unwrap();

        assert!(delete_table(&conn, a).unwrap());

        assert!(get_table(&conn, a).unwrap().is_none());
        assert_eq!(columns_for_table(&conn, a).unwrap().len(), 0);
        let after = counts(&conn).unwrap();
        assert_eq!(after.tables, 1);
        assert_eq!(after.columns, 0);
        assert_eq!(after.lineage_edges, 0);
        assert_eq!(after.feedback_entries, 0);
        // the other table is untouched
        assert!(get_table(&conn, b).unwrap().is_some());
    }

    #[test]
    fn deleting_a_missing_table_reports_false() {
        let conn = test_conn();
        assert!(!delete_table(&conn, 999).unwrap());
    }

    #[test]
    fn lineage_names_are_one_hop_in_both_directions() {
        let conn = test_conn();
        let a = seed_table(&conn, "public", "a");
        let b = seed_table(&conn, "public", "b");
        let c = seed_table(&conn, "public", "c");
        insert_lineage(&conn, a, b, "join").unwrap();
        insert_lineage(&conn, c, b, "join").unwrap();
        insert_lineage(&conn, b, c, "aggregate").unwrap();

        assert_eq!(upstream_table_names(&conn, b).unwrap(), vec!["a", "c"]);
        assert_eq!(downstream_table_names(&conn, a).unwrap(), vec!["b"]);
        // cycles are allowed: b -> c and c -> b can coexist
        assert_eq!(downstream_table_names(&conn, b).unwrap(), vec!["c"]);
        assert_eq!(upstream_table_names(&conn, a).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn enrichment_writes_persist_and_stamp_updated_at() {
        let conn = test_conn();
        let id = seed_table(&conn, "public", "users");

        set_business_definition(&conn, id, "All registered users.").unwrap();
        set_quality_score(&conn, id, 87).unwrap();
        set_tags(&conn, id, &["users".to_string(), "core_data".to_string()]).unwrap();

        let table = get_table(&conn, id).unwrap().unwrap();
        assert_eq!(table.business_definition.as_deref(), Some("All registered users."));
        assert_eq!(table.data_quality_score, Some(87));
        assert_eq!(table.tags, vec!["users", "core_data"]);
        assert!(table.updated_at.is_some());
    }

    #[test]
    fn feedback_is_append_only_with_fields_intact() {
        let conn = test_conn();
        let id = seed_table(&conn, "public", "orders");
        for n in 0..3 {
            let entry = insert_feedback(
                &conn,
                &NewFeedbackRecord {
                    table_id: id,
                    column_id: None,
                    feedback_text: format!("note {n}"),
                },
            )
            .unwrap();
            assert_eq!(entry.status, "Pending Review");
            assert!(entry.created_at.is_some());
        }

        let all = list_feedback(&conn).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].feedback_text, "note 2");
        assert_eq!(all[2].table_id, id);
    }

    #[test]
    fn search_filters_on_table_and_schema_name() {
        let conn = test_conn();
        seed_table(&conn, "finance", "orders");
        seed_table(&conn, "retail", "customers");

        let hits = list_tables(&conn, Some("ORD")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].table_name, "orders");

        let by_schema = list_tables(&conn, Some("retail")).unwrap();
        assert_eq!(by_schema.len(), 1);
        assert_eq!(by_schema[0].table_name, "customers");
    }

    #[test]
    fn schemas_group_into_domains() {
        let conn = test_conn();
        seed_table(&conn, "finance", "orders");
        seed_table(&conn, "finance", "refunds");
        seed_table(&conn, "retail", "customers");

        let schemas = list_schemas(&conn).unwrap();
        assert_eq!(schemas, vec![("finance".to_string(), 2), ("retail".to_string(), 1)]);
        assert_eq!(tables_in_schema(&conn, "finance").unwrap().len(), 2);
    }
}
