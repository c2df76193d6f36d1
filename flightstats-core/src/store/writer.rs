//! Write side: the repository as an ingestion sink.

use rusqlite::{params, Transaction};

use super::schema::CREATE_FLIGHT_TABLE;
use super::FlightRepository;
use crate::data::{IngestReport, RecordSink, SinkError};
use crate::domain::FlightRecord;

const INSERT_RECORD: &str =
    "INSERT INTO flight_data (ANO, MES, MERCADO, RPK, ASK) VALUES (?1, ?2, ?3, ?4, ?5)";

impl RecordSink for FlightRepository {
    fn replace(&mut self, records: &[FlightRecord]) -> Result<(), SinkError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS flight_data;")?;
        tx.execute_batch(CREATE_FLIGHT_TABLE)?;
        insert_all(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn append(&mut self, records: &[FlightRecord]) -> Result<(), SinkError> {
        let tx = self.conn.transaction()?;
        insert_all(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn record_run(&mut self, report: &IngestReport) -> Result<(), SinkError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO ingest_meta
                (id, source, source_hash, chunks, rows_read, rows_written, ingested_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                report.source.display().to_string(),
                report.source_hash,
                count_column(report.chunks, "chunks")?,
                count_column(report.rows_read, "rows_read")?,
                count_column(report.rows_written, "rows_written")?,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn count_column(n: usize, name: &str) -> Result<i64, SinkError> {
    i64::try_from(n).map_err(|_| SinkError::Other(format!("{name} = {n} does not fit in INTEGER")))
}

fn insert_all(tx: &Transaction<'_>, records: &[FlightRecord]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare_cached(INSERT_RECORD)?;
    for rec in records {
        stmt.execute(params![rec.year, rec.month, rec.market, rec.rpk, rec.ask])?;
    }
    Ok(())
}
