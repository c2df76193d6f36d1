//! Metadata about the most recent ingestion run.

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;

use super::FlightRepository;

/// Row of the `ingest_meta` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestMeta {
    pub source: String,
    pub source_hash: String,
    pub chunks: i64,
    pub rows_read: i64,
    pub rows_written: i64,
    /// `None` if the stored timestamp cannot be parsed.
    pub ingested_at: Option<DateTime<Utc>>,
}

impl FlightRepository {
    /// Metadata recorded by the last ingestion run, if any.
    pub fn last_ingest(&self) -> rusqlite::Result<Option<IngestMeta>> {
        self.conn
            .query_row(
                "SELECT source, source_hash, chunks, rows_read, rows_written, ingested_at
                 FROM ingest_meta WHERE id = 1",
                [],
                |row| {
                    let ingested_at: String = row.get(5)?;
                    Ok(IngestMeta {
                        source: row.get(0)?,
                        source_hash: row.get(1)?,
                        chunks: row.get(2)?,
                        rows_read: row.get(3)?,
                        rows_written: row.get(4)?,
                        ingested_at: DateTime::parse_from_rfc3339(&ingested_at)
                            .ok()
                            .map(|t| t.with_timezone(&Utc)),
                    })
                },
            )
            .optional()
    }
}
