//! FlightRecord: one aggregated row of the `flight_data` table.

use serde::{Deserialize, Serialize};

/// Traffic for one market in one year/month.
///
/// `market` always holds the sorted airport-pair key (see [`super::market_key`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub year: i32,
    pub month: u32,
    pub market: String,
    /// Revenue passenger-kilometers.
    pub rpk: f64,
    /// Available seat-kilometers. Absent in rows loaded from older exports.
    pub ask: Option<f64>,
}

impl FlightRecord {
    /// Chart label for this record's period, e.g. `2023-01`.
    pub fn period_label(&self) -> String {
        period_label(self.year, self.month)
    }
}

/// Format a period as `{year}-{month:02}`.
pub fn period_label(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

/// Parse a metric cell. Empty, unparsable and NaN cells yield `None`.
pub fn parse_metric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse a metric cell, repairing anything unparsable to `0.0`.
pub fn coerce_metric(raw: &str) -> f64 {
    parse_metric(raw).unwrap_or(0.0)
}
