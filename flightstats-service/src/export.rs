//! Export of query results: CSV for spreadsheets, a Markdown table for reports.

use anyhow::{Context, Result};
use flightstats_core::domain::{period_label, FlightRecord, PeriodFilter};

/// CSV column header, in column order.
pub const CSV_HEADER: [&str; 4] = ["ANO", "MES", "MERCADO", "RPK"];

// ─── CSV export ─────────────────────────────────────────────────────

/// Export records as CSV, one row per record in the given order.
///
/// An empty slice yields the header row alone.
pub fn export_csv(records: &[FlightRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        wtr.write_record([
            &r.year.to_string(),
            &r.month.to_string(),
            &r.market,
            &r.rpk.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown table ─────────────────────────────────────────────────

/// Render records as a Markdown report titled with the filter's market and period.
pub fn export_table(records: &[FlightRecord], filter: &PeriodFilter) -> String {
    let mut md = String::with_capacity(256 + records.len() * 48);

    md.push_str(&format!("# Flight data: {}\n\n", filter.market()));
    md.push_str(&format!(
        "Period: {} to {}\n\n",
        period_label(filter.year_start(), filter.month_start()),
        period_label(filter.year_end(), filter.month_end())
    ));

    md.push_str("| Year | Month | Market | RPK |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    for r in records {
        md.push_str(&format!(
            "| {} | {} | {} | {:.2} |\n",
            r.year, r.month, r.market, r.rpk
        ));
    }

    if !records.is_empty() {
        let total: f64 = records.iter().map(|r| r.rpk).sum();
        md.push_str(&format!("\nTotal RPK: {total:.2}\n"));
    }
    md
}
