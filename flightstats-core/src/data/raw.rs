//! Raw statistics rows and the pure row transform.
//!
//! The transform is independent of any sink: it decides whether a row is
//! kept and what [`FlightRecord`] it becomes, nothing more.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::{market_key, parse_metric, FlightRecord};

/// One data line of the statistics CSV.
///
/// Only the columns the pipeline reads are mapped; any other column in the
/// file is ignored. `ASK` is optional so older exports without it still load.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "EMPRESA_SIGLA")]
    pub carrier: String,
    #[serde(rename = "GRUPO_DE_VOO")]
    pub flight_group: String,
    #[serde(rename = "NATUREZA")]
    pub nature: String,
    #[serde(rename = "AEROPORTO_DE_ORIGEM_SIGLA")]
    pub origin: Option<String>,
    #[serde(rename = "AEROPORTO_DE_DESTINO_SIGLA")]
    pub destination: Option<String>,
    #[serde(rename = "ANO")]
    pub year: i32,
    #[serde(rename = "MES")]
    pub month: u32,
    #[serde(rename = "RPK")]
    pub rpk: Option<String>,
    #[serde(rename = "ASK", default)]
    pub ask: Option<String>,
}

/// Row-level filter: exact string equality on carrier, flight group and nature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    pub carrier: String,
    pub flight_group: String,
    pub nature: String,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            carrier: "GLO".into(),
            flight_group: "REGULAR".into(),
            nature: "DOMÉSTICA".into(),
        }
    }
}

impl RowFilter {
    pub fn accepts(&self, row: &RawRow) -> bool {
        row.carrier == self.carrier
            && row.flight_group == self.flight_group
            && row.nature == self.nature
    }
}

/// Filter a raw row and project it to a [`FlightRecord`].
///
/// Returns `None` for rows rejected by `filter`. An unparsable RPK becomes
/// `0.0`; an empty or unparsable ASK becomes `None`.
pub fn transform(row: &RawRow, filter: &RowFilter) -> Option<FlightRecord> {
    if !filter.accepts(row) {
        return None;
    }

    let market = market_key(row.origin.as_deref(), row.destination.as_deref());
    let raw_rpk = row.rpk.as_deref().unwrap_or("");
    let rpk = parse_metric(raw_rpk).unwrap_or_else(|| {
        debug!(
            "coerced RPK {raw_rpk:?} to 0.0 for {market} {}-{:02}",
            row.year, row.month
        );
        0.0
    });

    Some(FlightRecord {
        year: row.year,
        month: row.month,
        market,
        rpk,
        ask: row.ask.as_deref().and_then(parse_metric),
    })
}
