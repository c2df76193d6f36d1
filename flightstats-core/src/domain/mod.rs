//! Domain types for FlightStats

pub mod filter;
pub mod market;
pub mod record;

pub use filter::{FilterRequest, PeriodFilter, ValidationError, DEFAULT_MONTH_END, DEFAULT_MONTH_START};
pub use market::market_key;
pub use record::{coerce_metric, parse_metric, period_label, FlightRecord};
