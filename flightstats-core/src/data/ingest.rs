//! Chunked CSV ingestion.
//!
//! Reads the statistics file in batches of at most `chunk_size` rows, runs
//! each row through [`transform`], and hands the kept records to a
//! [`RecordSink`]. Chunks are processed strictly in order. The first chunk
//! replaces the sink's contents; later chunks append. A file with no data
//! rows replaces the contents with nothing. A failure part-way through leaves
//! the chunks already written in place.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::raw::{transform, RawRow, RowFilter};
use super::sink::{RecordSink, SinkError};
use crate::domain::FlightRecord;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("invalid ingest options: {0}")]
    InvalidOptions(String),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV in chunk {chunk}: {source}")]
    Csv {
        chunk: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed writing chunk {chunk}: {source}")]
    Sink {
        chunk: usize,
        #[source]
        source: SinkError,
    },
}

/// Options controlling how a statistics file is read and filtered.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Maximum number of raw rows per chunk.
    pub chunk_size: usize,
    /// Row-level filter applied before projection.
    pub row_filter: RowFilter,
    /// Field delimiter.
    pub delimiter: u8,
    /// Lines discarded before the column header.
    pub preamble_lines: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            row_filter: RowFilter::default(),
            delimiter: b';',
            preamble_lines: 1,
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: PathBuf,
    /// BLAKE3 hash of the source file, hex encoded.
    pub source_hash: String,
    pub chunks: usize,
    pub rows_read: usize,
    pub rows_written: usize,
}

impl IngestReport {
    /// True when no row survived the filters.
    pub fn is_empty(&self) -> bool {
        self.rows_written == 0
    }
}

/// Ingest a statistics CSV into `sink`.
///
/// Returns the run summary; `rows_written` is the total number of records
/// written across all chunks. Zero written rows is not an error, only a
/// warning.
pub fn ingest_csv<S: RecordSink + ?Sized>(
    path: &Path,
    opts: &IngestOptions,
    sink: &mut S,
) -> Result<IngestReport, IngestError> {
    if !path.exists() {
        return Err(IngestError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    if opts.chunk_size == 0 {
        return Err(IngestError::InvalidOptions(
            "chunk_size must be at least 1".into(),
        ));
    }

    let io_err = |source: io::Error| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let source_hash = hash_file(path).map_err(io_err)?;
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    skip_lines(&mut reader, opts.preamble_lines).map_err(io_err)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| IngestError::Csv { chunk: 1, source })?;
    debug!("columns: {:?}", headers.iter().collect::<Vec<_>>());

    let mut rows = csv_reader.deserialize::<RawRow>();
    let mut chunk: Vec<RawRow> = Vec::with_capacity(opts.chunk_size.min(DEFAULT_CHUNK_SIZE));
    let mut report = IngestReport {
        source: path.to_path_buf(),
        source_hash,
        chunks: 0,
        rows_read: 0,
        rows_written: 0,
    };

    loop {
        let chunk_no = report.chunks + 1;
        chunk.clear();
        for result in rows.by_ref().take(opts.chunk_size) {
            let row = result.map_err(|source| IngestError::Csv {
                chunk: chunk_no,
                source,
            })?;
            chunk.push(row);
        }
        if chunk.is_empty() {
            break;
        }

        let records: Vec<FlightRecord> = chunk
            .iter()
            .filter_map(|row| transform(row, &opts.row_filter))
            .collect();
        info!(
            "chunk {chunk_no}: {} rows read, {} after filter",
            chunk.len(),
            records.len()
        );

        let written = if report.chunks == 0 {
            sink.replace(&records)
        } else {
            sink.append(&records)
        };
        written.map_err(|source| IngestError::Sink {
            chunk: chunk_no,
            source,
        })?;

        report.chunks = chunk_no;
        report.rows_read += chunk.len();
        report.rows_written += records.len();
    }

    // No data rows at all: still replace, so the table matches the recorded run.
    if report.chunks == 0 {
        sink.replace(&[])
            .map_err(|source| IngestError::Sink { chunk: 1, source })?;
    }

    if report.is_empty() {
        warn!(
            "no rows written from {}; check the row filter ({:?}) or the file contents",
            path.display(),
            opts.row_filter
        );
    } else {
        info!(
            "ingested {} of {} rows from {} in {} chunk(s)",
            report.rows_written,
            report.rows_read,
            path.display(),
            report.chunks
        );
    }

    sink.record_run(&report).map_err(|source| IngestError::Sink {
        chunk: report.chunks,
        source,
    })?;

    Ok(report)
}

fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

fn skip_lines<R: BufRead>(reader: &mut R, count: usize) -> io::Result<()> {
    let mut discard = Vec::new();
    for _ in 0..count {
        discard.clear();
        if reader.read_until(b'\n', &mut discard)? == 0 {
            break;
        }
    }
    Ok(())
}
