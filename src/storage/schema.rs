//! Database schema definitions
//!
//! This module contains the SQL schema for the snippet store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Display excerpt of each crawled page
CREATE TABLE IF NOT EXISTS snippets (
    url TEXT PRIMARY KEY,
    snippet TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database; every statement is `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
