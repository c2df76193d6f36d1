//! FlightStats Core: flight records, period filters, ingestion and storage.
//!
//! This crate contains the data side of the dashboard:
//! - Domain types (flight records, market keys, validated period filters)
//! - Chunked CSV ingestion with a pure row transform
//! - SQLite store acting as ingestion sink and query repository

pub mod data;
pub mod domain;
pub mod store;

pub use data::{ingest_csv, IngestError, IngestOptions, IngestReport, RecordSink, RowFilter};
pub use domain::{FilterRequest, FlightRecord, PeriodFilter, ValidationError};
pub use store::{FlightRepository, QueryError, QueryOutcome};
