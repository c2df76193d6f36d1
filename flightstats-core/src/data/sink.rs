//! Sink abstraction for ingested records.

use thiserror::Error;

use super::ingest::IngestReport;
use crate::domain::FlightRecord;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("sink error: {0}")]
    Other(String),
}

/// Destination for ingested records.
///
/// The pipeline calls [`RecordSink::replace`] for the first chunk of a run and
/// [`RecordSink::append`] for every chunk after it. Each call is expected to be
/// atomic on its own; nothing spans chunks.
pub trait RecordSink {
    /// Drop any existing rows and write `records` as the new contents.
    fn replace(&mut self, records: &[FlightRecord]) -> Result<(), SinkError>;

    /// Append `records` to the current contents.
    fn append(&mut self, records: &[FlightRecord]) -> Result<(), SinkError>;

    /// Called once after the last chunk. Sinks that keep run metadata store it here.
    fn record_run(&mut self, _report: &IngestReport) -> Result<(), SinkError> {
        Ok(())
    }
}
