//! SQLite-backed flight store.
//!
//! [`FlightRepository`] owns one connection. It is the ingestion sink
//! ([`crate::data::RecordSink`], see `writer`) and the read side used at
//! request time (see `repository`).

mod meta;
mod repository;
pub mod schema;
mod writer;

use std::path::Path;

use rusqlite::Connection;

pub use meta::IngestMeta;
pub use repository::{MarketCoverage, QueryError, QueryOutcome};

/// Flight statistics database.
pub struct FlightRepository {
    conn: Connection,
}

impl FlightRepository {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating or migrating the schema.
    pub fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for tables that share this database.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
