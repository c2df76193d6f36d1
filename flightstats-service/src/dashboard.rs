//! Dashboard service: the request boundary in front of the repository.
//!
//! Validates incoming filters, runs the range query, and shapes results into
//! chart payloads or exports. `handle_chart` maps every failure to a status
//! code so callers never see a raw storage error:
//! - validation failures → 400 with the validation message
//! - unknown market → 404
//! - anything else → logged, 500 "internal server error"

use std::path::Path;

use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;

use flightstats_core::data::{ingest_csv, IngestError, IngestOptions, IngestReport};
use flightstats_core::domain::{FilterRequest, FlightRecord, PeriodFilter, ValidationError};
use flightstats_core::store::{FlightRepository, QueryError, QueryOutcome};

use crate::export::{export_csv, export_table};
use crate::history::FilterHistory;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Errors from the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown market: {market}")]
    UnknownMarket { market: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Export(#[from] anyhow::Error),
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownMarket { market } => ServiceError::UnknownMarket { market },
            QueryError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

impl ServiceError {
    /// HTTP-style status for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::UnknownMarket { .. } => 404,
            ServiceError::Storage(_) | ServiceError::Export(_) => 500,
        }
    }
}

/// Payload for the dashboard's first render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialData {
    pub markets: Vec<String>,
    pub years: Vec<i32>,
}

/// Chart series for one market and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// `"YYYY-MM"` per point.
    pub labels: Vec<String>,
    /// RPK per point.
    pub values: Vec<f64>,
    /// True iff there is exactly one point.
    pub single_point: bool,
    /// Set when the period holds no data; `null` otherwise.
    pub message: Option<String>,
}

impl ChartData {
    pub fn from_records(records: &[FlightRecord]) -> Self {
        let labels: Vec<String> = records.iter().map(FlightRecord::period_label).collect();
        let values = records.iter().map(|r| r.rpk).collect();
        Self {
            single_point: labels.len() == 1,
            labels,
            values,
            message: None,
        }
    }

    pub fn no_data(filter: &PeriodFilter) -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
            single_point: false,
            message: Some(format!(
                "No data found for {} between {}-{} and {}-{}.",
                filter.market(),
                filter.year_start(),
                filter.month_start(),
                filter.year_end(),
                filter.month_end()
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Response body: a chart or an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Chart(ChartData),
    Error { error: String },
}

/// Status plus body, as handed to a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn ok(chart: ChartData) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Chart(chart),
        }
    }

    pub fn from_error(err: &ServiceError) -> Self {
        let status = err.status();
        let message = if status == 500 {
            error!("chart request failed: {err}");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            err.to_string()
        };
        Self {
            status,
            body: ResponseBody::Error { error: message },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// JSON rendering of the body.
    pub fn body_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}

/// Dashboard operations over one repository.
pub struct DashboardService {
    repo: FlightRepository,
}

impl DashboardService {
    pub fn new(repo: FlightRepository) -> Self {
        Self { repo }
    }

    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, ServiceError> {
        Ok(Self::new(FlightRepository::open(path)?))
    }

    pub fn repository(&self) -> &FlightRepository {
        &self.repo
    }

    /// Ingest a statistics file into this service's database.
    pub fn ingest(&mut self, path: &Path, opts: &IngestOptions) -> Result<IngestReport, IngestError> {
        ingest_csv(path, opts, &mut self.repo)
    }

    /// Market and year lists for the filter controls.
    pub fn initial_data(&self) -> Result<InitialData, ServiceError> {
        Ok(InitialData {
            markets: self.repo.list_markets()?,
            years: self.repo.list_years()?,
        })
    }

    /// Validate `request` and fetch its rows. A known market with no rows in
    /// the period gives an empty vector.
    pub fn records(
        &self,
        request: &FilterRequest,
    ) -> Result<(PeriodFilter, Vec<FlightRecord>), ServiceError> {
        let filter = request.validate()?;
        let outcome = self.repo.query_range(&filter)?;
        if outcome.is_empty() {
            self.log_empty_period(&filter);
        }
        Ok((filter, outcome.into_records()))
    }

    pub fn chart(&self, request: &FilterRequest) -> Result<ChartData, ServiceError> {
        let filter = request.validate()?;
        self.chart_for_filter(&filter)
    }

    /// Like [`chart`](Self::chart), then records the filter in `user`'s history.
    ///
    /// Only filters that produced a chart (data or the no-data message) are
    /// recorded; validation and unknown-market failures are not.
    pub fn chart_for_user(
        &self,
        user: &str,
        request: &FilterRequest,
    ) -> Result<ChartData, ServiceError> {
        let filter = request.validate()?;
        let chart = self.chart_for_filter(&filter)?;
        let id = self.history()?.record(user, &filter)?;
        info!("recorded filter #{id} for {user}");
        Ok(chart)
    }

    /// Chart a filter from `user`'s history. `None` if the entry does not exist.
    pub fn replay(&self, user: &str, id: i64) -> Result<Option<ChartData>, ServiceError> {
        let Some(entry) = self.history()?.get(user, id)? else {
            return Ok(None);
        };
        let filter = entry.to_filter()?;
        self.chart_for_filter(&filter).map(Some)
    }

    /// Chart request with failures mapped to status codes.
    pub fn handle_chart(&self, request: &FilterRequest) -> ApiResponse {
        match self.chart(request) {
            Ok(chart) => ApiResponse::ok(chart),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    /// CSV export for `request`; an empty period yields the header only.
    pub fn csv_for(&self, request: &FilterRequest) -> Result<String, ServiceError> {
        let (_, records) = self.records(request)?;
        Ok(export_csv(&records)?)
    }

    /// Markdown table for `request`.
    pub fn table_for(&self, request: &FilterRequest) -> Result<String, ServiceError> {
        let (filter, records) = self.records(request)?;
        Ok(export_table(&records, &filter))
    }

    pub fn history(&self) -> Result<FilterHistory<'_>, ServiceError> {
        Ok(FilterHistory::new(self.repo.connection())?)
    }

    fn chart_for_filter(&self, filter: &PeriodFilter) -> Result<ChartData, ServiceError> {
        match self.repo.query_range(filter)? {
            QueryOutcome::Found(records) => Ok(ChartData::from_records(&records)),
            QueryOutcome::NoData => {
                self.log_empty_period(filter);
                Ok(ChartData::no_data(filter))
            }
        }
    }

    fn log_empty_period(&self, filter: &PeriodFilter) {
        match self.repo.market_coverage(filter.market()) {
            Ok(coverage) => warn!(
                "no data for {} in {}-{}..{}-{}; stored years {:?}, months {:?}",
                filter.market(),
                filter.year_start(),
                filter.month_start(),
                filter.year_end(),
                filter.month_end(),
                coverage.years,
                coverage.months
            ),
            Err(e) => warn!("no data for {}; coverage lookup failed: {e}", filter.market()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, month: u32, rpk: f64) -> FlightRecord {
        FlightRecord {
            year,
            month,
            market: "SBGRSBSV".into(),
            rpk,
            ask: None,
        }
    }

    #[test]
    fn single_point_only_for_one_label() {
        assert!(!ChartData::from_records(&[]).single_point);
        assert!(ChartData::from_records(&[rec(2023, 1, 1.0)]).single_point);
        assert!(!ChartData::from_records(&[rec(2023, 1, 1.0), rec(2023, 2, 2.0)]).single_point);
    }

    #[test]
    fn no_data_message_names_market_and_period() {
        let filter = PeriodFilter::validate("SBGRSBSV", 2020, 2021, 3, 4).unwrap();
        let chart = ChartData::no_data(&filter);
        assert!(chart.is_empty());
        assert!(!chart.single_point);
        assert_eq!(
            chart.message.as_deref(),
            Some("No data found for SBGRSBSV between 2020-3 and 2021-4.")
        );
    }

    #[test]
    fn status_codes_by_error_kind() {
        let validation = ServiceError::from(ValidationError::YearEndBeforeStart {
            year_start: 2024,
            year_end: 2023,
        });
        assert_eq!(validation.status(), 400);

        let unknown = ServiceError::from(QueryError::UnknownMarket {
            market: "X".into(),
        });
        assert_eq!(unknown.status(), 404);

        let storage = ServiceError::Storage(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(storage.status(), 500);
        let response = ApiResponse::from_error(&storage);
        assert_eq!(
            response.body,
            ResponseBody::Error {
                error: INTERNAL_ERROR_MESSAGE.into()
            }
        );
    }

    #[test]
    fn chart_body_serializes_flat() {
        let response = ApiResponse::ok(ChartData::from_records(&[rec(2023, 1, 1000.0)]));
        let json: serde_json::Value = serde_json::from_str(&response.body_json().unwrap()).unwrap();
        assert_eq!(json["labels"][0], "2023-01");
        assert_eq!(json["values"][0], 1000.0);
        assert_eq!(json["single_point"], true);
        assert!(json.get("message").is_some());
        assert!(json["message"].is_null());
    }

    #[test]
    fn no_data_body_carries_message() {
        let filter = PeriodFilter::full_years("SBGRSBSV", 2020, 2020).unwrap();
        let response = ApiResponse::ok(ChartData::no_data(&filter));
        let json: serde_json::Value = serde_json::from_str(&response.body_json().unwrap()).unwrap();
        assert!(json["message"].as_str().unwrap().starts_with("No data found"));
        assert_eq!(json["labels"], serde_json::json!([]));
    }
}
