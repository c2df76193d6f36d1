//! Data ingestion: raw CSV rows, the pure row transform, and the chunked
//! pipeline that feeds a [`RecordSink`].
//!
//! ```text
//!  statistics CSV (';'-delimited, one preamble line)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  ingest   │  read chunks of RawRow
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ transform │  RowFilter + market key → Option<FlightRecord>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   sink    │  first chunk replaces, later chunks append
//!   └──────────┘
//! ```

pub mod ingest;
pub mod raw;
pub mod sink;

pub use ingest::{ingest_csv, IngestError, IngestOptions, IngestReport, DEFAULT_CHUNK_SIZE};
pub use raw::{transform, RawRow, RowFilter};
pub use sink::{RecordSink, SinkError};
