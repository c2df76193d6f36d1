//! PeriodFilter: the validated market + year/month range a query runs over.
//!
//! Filters arrive from the web layer as a [`FilterRequest`] and are validated
//! eagerly into a [`PeriodFilter`]. A `PeriodFilter` cannot be built any other
//! way, so the repository never sees an out-of-contract range.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::FlightRecord;

pub const DEFAULT_MONTH_START: u32 = 1;
pub const DEFAULT_MONTH_END: u32 = 12;

/// Why a filter was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("year_end below year_start ({year_end} < {year_start})")]
    YearEndBeforeStart { year_start: i32, year_end: i32 },

    #[error("month_end below month_start within {year} ({month_end} < {month_start})")]
    MonthEndBeforeStart {
        year: i32,
        month_start: u32,
        month_end: u32,
    },
}

/// A validated period filter.
///
/// Invariants:
/// - `year_end >= year_start`
/// - `month_end >= month_start` when `year_start == year_end`
///
/// Cross-year ranges are not checked month-wise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodFilter {
    market: String,
    year_start: i32,
    year_end: i32,
    month_start: u32,
    month_end: u32,
}

impl PeriodFilter {
    /// Validate a filter.
    pub fn validate(
        market: impl Into<String>,
        year_start: i32,
        year_end: i32,
        month_start: u32,
        month_end: u32,
    ) -> Result<Self, ValidationError> {
        if year_end < year_start {
            return Err(ValidationError::YearEndBeforeStart {
                year_start,
                year_end,
            });
        }
        if year_start == year_end && month_end < month_start {
            return Err(ValidationError::MonthEndBeforeStart {
                year: year_start,
                month_start,
                month_end,
            });
        }
        Ok(Self {
            market: market.into(),
            year_start,
            year_end,
            month_start,
            month_end,
        })
    }

    /// Validate a filter covering whole years (months default to 1..=12).
    pub fn full_years(
        market: impl Into<String>,
        year_start: i32,
        year_end: i32,
    ) -> Result<Self, ValidationError> {
        Self::validate(
            market,
            year_start,
            year_end,
            DEFAULT_MONTH_START,
            DEFAULT_MONTH_END,
        )
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn year_start(&self) -> i32 {
        self.year_start
    }

    pub fn year_end(&self) -> i32 {
        self.year_end
    }

    pub fn month_start(&self) -> u32 {
        self.month_start
    }

    pub fn month_end(&self) -> u32 {
        self.month_end
    }

    /// In-process form of the repository's range predicate.
    ///
    /// `(year in (ys, ye)) OR (year == ys AND month >= ms) OR (year == ye AND month <= me)`.
    /// When `ys == ye` the last two clauses are OR-ed, not AND-ed.
    pub fn matches_period(&self, year: i32, month: u32) -> bool {
        (year > self.year_start && year < self.year_end)
            || (year == self.year_start && month >= self.month_start)
            || (year == self.year_end && month <= self.month_end)
    }

    /// Market equality plus [`Self::matches_period`].
    pub fn matches(&self, record: &FlightRecord) -> bool {
        record.market == self.market && self.matches_period(record.year, record.month)
    }
}

fn default_month_start() -> u32 {
    DEFAULT_MONTH_START
}

fn default_month_end() -> u32 {
    DEFAULT_MONTH_END
}

/// Unvalidated filter as submitted by a caller (form or JSON body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub market: String,
    pub year_start: i32,
    pub year_end: i32,
    #[serde(default = "default_month_start")]
    pub month_start: u32,
    #[serde(default = "default_month_end")]
    pub month_end: u32,
}

impl FilterRequest {
    /// Request covering whole years.
    pub fn new(market: impl Into<String>, year_start: i32, year_end: i32) -> Self {
        Self {
            market: market.into(),
            year_start,
            year_end,
            month_start: DEFAULT_MONTH_START,
            month_end: DEFAULT_MONTH_END,
        }
    }

    pub fn with_months(mut self, month_start: u32, month_end: u32) -> Self {
        self.month_start = month_start;
        self.month_end = month_end;
        self
    }

    pub fn validate(&self) -> Result<PeriodFilter, ValidationError> {
        PeriodFilter::validate(
            self.market.clone(),
            self.year_start,
            self.year_end,
            self.month_start,
            self.month_end,
        )
    }
}
