//! v001 -- Initial schema creation.
//!
//! Creates the `mirror` table: a per-device key -> string map whose keys are
//! namespaced by account id.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS mirror (
    key        TEXT PRIMARY KEY NOT NULL,   -- e.g. following_alice.near
    value      TEXT NOT NULL,               -- JSON document
    updated_at TEXT NOT NULL                -- RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
