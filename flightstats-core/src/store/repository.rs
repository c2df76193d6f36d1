//! Read side: market/year listings and the period range query.

use log::info;
use rusqlite::types::ValueRef;
use rusqlite::{named_params, Row};
use serde::Serialize;
use thiserror::Error;

use super::FlightRepository;
use crate::domain::{coerce_metric, FlightRecord, PeriodFilter};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown market: {market}")]
    UnknownMarket { market: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Result of a range query for a market that exists.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows in insertion order.
    Found(Vec<FlightRecord>),
    /// The market exists but has no rows in the requested period.
    NoData,
}

impl QueryOutcome {
    pub fn records(&self) -> &[FlightRecord] {
        match self {
            QueryOutcome::Found(records) => records,
            QueryOutcome::NoData => &[],
        }
    }

    pub fn into_records(self) -> Vec<FlightRecord> {
        match self {
            QueryOutcome::Found(records) => records,
            QueryOutcome::NoData => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::NoData)
    }
}

/// Distinct years and months stored for one market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketCoverage {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
}

// The three clauses are kept as written: when year_start == year_end the two
// boundary clauses are OR-ed, which is not the same as a BETWEEN.
const RANGE_QUERY: &str = "
    SELECT ANO, MES, MERCADO, RPK, ASK
    FROM flight_data
    WHERE MERCADO = :market
      AND ((ANO > :year_start AND ANO < :year_end)
           OR (ANO = :year_start AND MES >= :month_start)
           OR (ANO = :year_end AND MES <= :month_end))
    ORDER BY rowid
";

impl FlightRepository {
    /// Distinct markets, sorted ascending.
    pub fn list_markets(&self) -> Result<Vec<String>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT MERCADO FROM flight_data WHERE MERCADO IS NOT NULL ORDER BY MERCADO",
        )?;
        let markets = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(markets)
    }

    /// Distinct years, sorted ascending.
    pub fn list_years(&self) -> Result<Vec<i32>, QueryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT ANO FROM flight_data WHERE ANO IS NOT NULL ORDER BY ANO")?;
        let years = stmt
            .query_map([], |row| row.get::<_, i32>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(years)
    }

    /// Whether any row carries this market key.
    pub fn has_market(&self, market: &str) -> Result<bool, QueryError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM flight_data WHERE MERCADO = ?1)",
            [market],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    /// Rows for `filter.market()` inside the filter's period.
    ///
    /// Fails with [`QueryError::UnknownMarket`] before running the range query
    /// if the market is not stored at all. A known market with nothing in the
    /// period yields [`QueryOutcome::NoData`].
    pub fn query_range(&self, filter: &PeriodFilter) -> Result<QueryOutcome, QueryError> {
        if !self.has_market(filter.market())? {
            return Err(QueryError::UnknownMarket {
                market: filter.market().to_string(),
            });
        }

        let mut stmt = self.conn.prepare_cached(RANGE_QUERY)?;
        let records = stmt
            .query_map(
                named_params! {
                    ":market": filter.market(),
                    ":year_start": filter.year_start(),
                    ":year_end": filter.year_end(),
                    ":month_start": filter.month_start(),
                    ":month_end": filter.month_end(),
                },
                read_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "query {} {}-{:02}..{}-{:02}: {} row(s)",
            filter.market(),
            filter.year_start(),
            filter.month_start(),
            filter.year_end(),
            filter.month_end(),
            records.len()
        );

        if records.is_empty() {
            Ok(QueryOutcome::NoData)
        } else {
            Ok(QueryOutcome::Found(records))
        }
    }

    /// Years and months present for a market, both sorted ascending.
    pub fn market_coverage(&self, market: &str) -> Result<MarketCoverage, QueryError> {
        let mut years_stmt = self.conn.prepare(
            "SELECT DISTINCT ANO FROM flight_data WHERE MERCADO = ?1 AND ANO IS NOT NULL ORDER BY ANO",
        )?;
        let years = years_stmt
            .query_map([market], |row| row.get::<_, i32>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut months_stmt = self.conn.prepare(
            "SELECT DISTINCT MES FROM flight_data WHERE MERCADO = ?1 AND MES IS NOT NULL ORDER BY MES",
        )?;
        let months = months_stmt
            .query_map([market], |row| row.get::<_, u32>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MarketCoverage { years, months })
    }

    /// Total number of stored rows.
    pub fn count_rows(&self) -> Result<u64, QueryError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flight_data", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<FlightRecord> {
    Ok(FlightRecord {
        year: row.get(0)?,
        month: row.get(1)?,
        market: row.get(2)?,
        rpk: metric_or_zero(row.get_ref(3)?),
        ask: metric(row.get_ref(4)?),
    })
}

/// Numeric cell as `f64`; text is parsed, anything else is `None`.
fn metric(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Real(v) if !v.is_nan() => Some(v),
        ValueRef::Integer(v) => Some(v as f64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(crate::domain::parse_metric),
        _ => None,
    }
}

/// RPK read policy: values that are not numeric become `0.0`.
fn metric_or_zero(value: ValueRef<'_>) -> f64 {
    match value {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).map(coerce_metric).unwrap_or(0.0),
        other => metric(other).unwrap_or(0.0),
    }
}
