use crate::ingest::{IngestError, IngestSummary};
use crate::store::catalog;
use crate::store::models::{NewColumnRecord, NewTableRecord};
use duckdb::Connection;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

const SOURCE_LABEL: &str = "SQL DDL";
const DEFAULT_SCHEMA: &str = "public";

/// One CREATE TABLE statement reduced to catalog rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub columns: Vec<(String, String)>,
}

/// Extracts table and column declarations from SQL source text by walking a
/// real parse tree. Statements other than CREATE TABLE are skipped; nested
/// parentheses and inline constraints cannot corrupt the column list the way
/// token-position scanning would.
pub fn parse_create_tables(sql: &str) -> Result<Vec<ParsedTable>, IngestError> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .map_err(|e| IngestError::ParsingError(e.to_string()))?;

    let mut tables = Vec::new();
    for statement in statements {
        let Statement::CreateTable(create) = statement else {
            continue;
        };

        let mut name_parts: Vec<String> = create
            .name
            .0
            .iter()
            .filter_map(|part| part.as_ident().map(|ident| ident.value.clone()))
            .collect();
        let Some(table_name) = name_parts.pop() else {
            continue;
        };
        let schema_name = name_parts.pop();

        let columns = create
            .columns
            .iter()
            .map(|column| (column.name.value.clone(), column.data_type.to_string()))
            .collect();

        tables.push(ParsedTable {
            schema_name,
            table_name,
            columns,
        });
    }

    Ok(tables)
}

/// Persists every CREATE TABLE in the DDL text as one catalog table with its
/// columns, all inside one transaction.
pub fn ingest(conn: &mut Connection, sql: &str) -> Result<IngestSummary, IngestError> {
    let parsed = parse_create_tables(sql)?;

    let mut summary = IngestSummary::default();
    let tx = conn.transaction()?;
    for table in &parsed {
        let table_id = catalog::insert_table(
            &tx,
            &NewTableRecord {
                table_name: table.table_name.clone(),
                schema_name: table
                    .schema_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
                source: Some(SOURCE_LABEL.to_string()),
            },
        )?;
        summary.tables += 1;

        for (column_name, data_type) in &table.columns {
            catalog::insert_column(
                &tx,
                &NewColumnRecord {
                    table_id,
                    column_name: column_name.clone(),
                    data_type: Some(data_type.clone()),
                    description: None,
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
    fn quoted_create_table_parses_to_name_and_typed_columns() {
        let parsed =
            parse_create_tables(r#"CREATE TABLE "orders" ("order_id" INT, "total" DECIMAL);"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![ParsedTable {
                schema_name: None,
                table_name: "orders".to_string(),
                columns: vec![
                    ("order_id".to_string(), "INT".to_string()),
                    ("total".to_string(), "DECIMAL".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn nested_parentheses_and_constraints_do_not_corrupt_columns() {
        let parsed = parse_create_tables(
            "CREATE TABLE payments (
                 payment_id BIGINT NOT NULL,
                 amount DECIMAL(10,2) DEFAULT (0),
                 status VARCHAR(32),
                 PRIMARY KEY (payment_id)
             );",
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].columns,
            vec![
                ("payment_id".to_string(), "BIGINT".to_string()),
                ("amount".to_string(), "DECIMAL(10,2)".to_string()),
                ("status".to_string(), "VARCHAR(32)".to_string()),
            ]
        );
    }

    #[test]
    fn schema_qualified_names_are_honored() {
        let parsed = parse_create_tables("CREATE TABLE finance.refunds (refund_id INT);").unwrap();
        assert_eq!(parsed[0].schema_name.as_deref(), Some("finance"));
        assert_eq!(parsed[0].table_name, "refunds");
    }

    #[test]
    fn statements_other_than_create_table_are_skipped() {
        let parsed = parse_create_tables(
            "INSERT INTO t VALUES (1);
             CREATE TABLE only_one (id INT);
             SELECT * FROM t;",
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].table_name, "only_one");
    }

    #[test]
    fn unparsable_sql_is_a_parsing_error() {
        assert!(matches!(
            parse_create_tables("CREATE TABLE ((("),
            Err(IngestError::ParsingError(_))
        ));
    }

    #[test]
    fn ingest_persists_every_statement_in_one_batch() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::initialize(&conn).unwrap();

        let summary = ingest(
            &mut conn,
            "CREATE TABLE a (x INT, y VARCHAR);
             CREATE TABLE finance.b (z DATE);",
        )
        .unwrap();
        assert_eq!(summary, IngestSummary { tables: 2, columns: 3 });

        let a = catalog::find_table(&conn, "public", "a").unwrap().unwrap();
        assert_eq!(a.source.as_deref(), Some(SOURCE_LABEL));
        assert_eq!(catalog::columns_for_table(&conn, a.id).unwrap().len(), 2);

        let b = catalog::find_table(&conn, "finance", "b").unwrap().unwrap();
        assert_eq!(catalog::columns_for_table(&conn, b.id).unwrap().len(), 1);
    }
}
