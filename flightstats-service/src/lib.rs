//! FlightStats Service: the dashboard layer over `flightstats-core`.
//!
//! This crate provides:
//! - TOML application config
//! - Dashboard operations (initial data, chart series, status-mapped responses)
//! - CSV and Markdown export of query results
//! - Per-user filter history

pub mod config;
pub mod dashboard;
pub mod export;
pub mod history;

pub use config::{AppConfig, ConfigError, IngestConfig};
pub use dashboard::{
    ApiResponse, ChartData, DashboardService, InitialData, ResponseBody, ServiceError,
    INTERNAL_ERROR_MESSAGE,
};
pub use export::{export_csv, export_table, CSV_HEADER};
pub use history::{FilterHistory, FilterHistoryEntry};
