use duckdb::Connection;
use tracing::info;

/// Catalog table definitions.
///
/// Referential integrity (column -> table, lineage -> table, feedback ->
/// table/column) is enforced by the store functions inside transactions
/// rather than by declarative foreign keys: DuckDB rejects updates to rows
/// referenced by a FK, which would block enrichment writes to
/// table_metadata.
const CATALOG_DDL: &str = "
CREATE SEQUENCE IF NOT EXISTS table_metadata_id_seq;
CREATE TABLE IF NOT EXISTS table_metadata (
    id BIGINT PRIMARY KEY DEFAULT nextval('table_metadata_id_seq'),
    table_name VARCHAR NOT NULL,
    schema_name VARCHAR NOT NULL,
    source VARCHAR,
    business_definition VARCHAR,
    data_quality_score INTEGER,
    tags VARCHAR,
    created_at TIMESTAMP DEFAULT current_timestamp,
    updated_at TIMESTAMP
);

CREATE SEQUENCE IF NOT EXISTS column_metadata_id_seq;
CREATE TABLE IF NOT EXISTS column_metadata (
    id BIGINT PRIMARY KEY DEFAULT nextval('column_metadata_id_seq'),
    table_id BIGINT NOT NULL,
    column_name VARCHAR NOT NULL,
    data_type VARCHAR,
    description VARCHAR
);

CREATE SEQUENCE IF NOT EXISTS lineage_metadata_id_seq;
CREATE TABLE IF NOT EXISTS lineage_metadata (
    id BIGINT PRIMARY KEY DEFAULT nextval('lineage_metadata_id_seq'),
    source_table_id BIGINT NOT NULL,
    target_table_id BIGINT NOT NULL,
    transformation_logic VARCHAR
);

CREATE SEQUENCE IF NOT EXISTS user_feedback_id_seq;
CREATE TABLE IF NOT EXISTS user_feedback (
    id BIGINT PRIMARY KEY DEFAULT nextval('user_feedback_id_seq'),
    table_id BIGINT NOT NULL,
    column_id BIGINT,
    feedback_text VARCHAR NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'Pending Review',
    created_at TIMESTAMP DEFAULT current_timestamp
);
";

/// Creates the catalog tables if they do not exist yet.
pub fn initialize(conn: &Connection) -> Result<(), duckdb::Error> {
    conn.execute_batch(CATALOG_DDL)?;
    info!("Catalog store schema initialized");
    Ok(())
}
