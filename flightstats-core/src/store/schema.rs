//! Table definitions and schema migration.

use log::info;
use rusqlite::Connection;

pub const FLIGHT_TABLE: &str = "flight_data";
pub const META_TABLE: &str = "ingest_meta";

/// Canonical `flight_data` layout. Column names follow the source statistics.
pub(crate) const CREATE_FLIGHT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS flight_data (
        ANO INTEGER,
        MES INTEGER,
        MERCADO TEXT,
        RPK REAL,
        ASK REAL
    );
    CREATE INDEX IF NOT EXISTS idx_flight_data_mercado ON flight_data(MERCADO);
";

const CREATE_META_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS ingest_meta (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        source TEXT NOT NULL,
        source_hash TEXT NOT NULL,
        chunks INTEGER NOT NULL,
        rows_read INTEGER NOT NULL,
        rows_written INTEGER NOT NULL,
        ingested_at TEXT NOT NULL
    );
";

/// Create missing tables and migrate a legacy `flight_data` without `ASK`.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_FLIGHT_TABLE)?;
    conn.execute_batch(CREATE_META_TABLE)?;

    if !has_column(conn, FLIGHT_TABLE, "ASK")? {
        info!("migrating {FLIGHT_TABLE}: adding ASK column");
        conn.execute_batch("ALTER TABLE flight_data ADD COLUMN ASK REAL;")?;
    }
    Ok(())
}

/// Whether `table` has a column named `column` (case-insensitive).
pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name?.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}
