//! Per-user filter history, stored next to the flight data.
//!
//! Every validated filter a user charts can be appended here; `recent` lists
//! them newest first so a front-end can offer "last used" shortcuts.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use flightstats_core::domain::{PeriodFilter, ValidationError};

pub const HISTORY_TABLE: &str = "user_filters";

const CREATE_HISTORY_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS user_filters (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user        TEXT NOT NULL,
        market      TEXT NOT NULL,
        year_start  INTEGER NOT NULL,
        year_end    INTEGER NOT NULL,
        month_start INTEGER NOT NULL,
        month_end   INTEGER NOT NULL,
        recorded_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_user_filters_user ON user_filters (user);
";

/// One stored filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterHistoryEntry {
    pub id: i64,
    pub user: String,
    pub market: String,
    pub year_start: i32,
    pub year_end: i32,
    pub month_start: u32,
    pub month_end: u32,
    pub recorded_at: DateTime<Utc>,
}

impl FilterHistoryEntry {
    /// Rebuild the filter. Rows edited outside this module are re-validated.
    pub fn to_filter(&self) -> Result<PeriodFilter, ValidationError> {
        PeriodFilter::validate(
            self.market.clone(),
            self.year_start,
            self.year_end,
            self.month_start,
            self.month_end,
        )
    }
}

/// Filter history over a borrowed connection.
pub struct FilterHistory<'a> {
    conn: &'a Connection,
}

impl<'a> FilterHistory<'a> {
    /// Wrap `conn`, creating the history table if needed.
    pub fn new(conn: &'a Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(CREATE_HISTORY_TABLE)?;
        Ok(Self { conn })
    }

    /// Append `filter` for `user` stamped with the current time. Returns the row id.
    pub fn record(&self, user: &str, filter: &PeriodFilter) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO user_filters
                 (user, market, year_start, year_end, month_start, month_end, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user,
                filter.market(),
                filter.year_start(),
                filter.year_end(),
                filter.month_start(),
                filter.month_end(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Up to `limit` entries for `user`, newest first.
    pub fn recent(&self, user: &str, limit: usize) -> rusqlite::Result<Vec<FilterHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user, market, year_start, year_end, month_start, month_end, recorded_at
             FROM user_filters
             WHERE user = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![user, limit], read_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Entry `id`, if it belongs to `user`.
    pub fn get(&self, user: &str, id: i64) -> rusqlite::Result<Option<FilterHistoryEntry>> {
        self.conn
            .query_row(
                "SELECT id, user, market, year_start, year_end, month_start, month_end, recorded_at
                 FROM user_filters
                 WHERE user = ?1 AND id = ?2",
                params![user, id],
                read_entry,
            )
            .optional()
    }

    /// Number of entries stored for `user`.
    pub fn count(&self, user: &str) -> rusqlite::Result<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_filters WHERE user = ?1",
            [user],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
    }
}

fn read_entry(row: &Row<'_>) -> rusqlite::Result<FilterHistoryEntry> {
    let stamp: String = row.get(7)?;
    let recorded_at = DateTime::parse_from_rfc3339(&stamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(FilterHistoryEntry {
        id: row.get(0)?,
        user: row.get(1)?,
        market: row.get(2)?,
        year_start: row.get(3)?,
        year_end: row.get(4)?,
        month_start: row.get(5)?,
        month_end: row.get(6)?,
        recorded_at,
    })
}
