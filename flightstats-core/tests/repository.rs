//! Integration tests for the query repository.

use flightstats_core::data::RecordSink;
use flightstats_core::domain::{FlightRecord, PeriodFilter};
use flightstats_core::store::{FlightRepository, MarketCoverage, QueryError, QueryOutcome};
use rusqlite::Connection;

fn rec(year: i32, month: u32, market: &str, rpk: f64) -> FlightRecord {
    FlightRecord {
        year,
        month,
        market: market.to_string(),
        rpk,
        ask: Some(rpk * 1.25),
    }
}

/// The dashboard scenario: two SBGRSBSV months in 2023, one SBFLSBGR month in 2024.
fn scenario_repo() -> FlightRepository {
    let mut repo = FlightRepository::open_in_memory().unwrap();
    repo.replace(&[
        rec(2023, 1, "SBGRSBSV", 1000.0),
        rec(2023, 2, "SBGRSBSV", 2000.0),
        rec(2024, 1, "SBFLSBGR", 1500.0),
    ])
    .unwrap();
    repo
}

/// Every month of 2021..=2023 for one market, RPK = year * 100 + month.
fn monthly_repo() -> FlightRepository {
    let mut repo = FlightRepository::open_in_memory().unwrap();
    let records: Vec<FlightRecord> = (2021..=2023)
        .flat_map(|y| (1..=12).map(move |m| rec(y, m, "SBGRSBSV", (y * 100 + m as i32) as f64)))
        .collect();
    repo.replace(&records).unwrap();
    repo
}

fn periods(outcome: &QueryOutcome) -> Vec<String> {
    outcome.records().iter().map(|r| r.period_label()).collect()
}

#[test]
fn lists_markets_and_years_sorted() {
    let repo = scenario_repo();
    assert_eq!(repo.list_markets().unwrap(), vec!["SBFLSBGR", "SBGRSBSV"]);
    assert_eq!(repo.list_years().unwrap(), vec![2023, 2024]);
}

#[test]
fn empty_store_lists_nothing() {
    let repo = FlightRepository::open_in_memory().unwrap();
    assert!(repo.list_markets().unwrap().is_empty());
    assert!(repo.list_years().unwrap().is_empty());
    assert_eq!(repo.count_rows().unwrap(), 0);
}

#[test]
fn scenario_single_year_range() {
    let repo = scenario_repo();
    let filter = PeriodFilter::validate("SBGRSBSV", 2023, 2023, 1, 2).unwrap();

    let outcome = repo.query_range(&filter).unwrap();

    assert_eq!(periods(&outcome), vec!["2023-01", "2023-02"]);
    let rpks: Vec<f64> = outcome.records().iter().map(|r| r.rpk).collect();
    assert_eq!(rpks, vec![1000.0, 2000.0]);
    assert_eq!(outcome.records()[0].ask, Some(1250.0));
}

#[test]
fn unknown_market_is_an_error() {
    let repo = scenario_repo();
    let filter = PeriodFilter::full_years("SBXXSBYY", 2023, 2024).unwrap();

    match repo.query_range(&filter) {
        Err(QueryError::UnknownMarket { market }) => assert_eq!(market, "SBXXSBYY"),
        other => panic!("expected UnknownMarket, got {other:?}"),
    }
}

#[test]
fn known_market_outside_period_is_no_data() {
    let repo = scenario_repo();
    let filter = PeriodFilter::full_years("SBGRSBSV", 2025, 2025).unwrap();

    let outcome = repo.query_range(&filter).unwrap();
    assert_eq!(outcome, QueryOutcome::NoData);
}

#[test]
fn cross_year_range_honours_boundary_months() {
    let repo = monthly_repo();
    let filter = PeriodFilter::validate("SBGRSBSV", 2021, 2023, 11, 2).unwrap();

    let labels = periods(&repo.query_range(&filter).unwrap());

    assert_eq!(labels.first().unwrap(), "2021-11");
    assert_eq!(labels.last().unwrap(), "2023-02");
    // Nov + Dec 2021, all of 2022, Jan + Feb 2023.
    assert_eq!(labels.len(), 2 + 12 + 2);
}

#[test]
fn adjacent_years_cover_only_boundary_clauses() {
    let repo = monthly_repo();
    let filter = PeriodFilter::validate("SBGRSBSV", 2022, 2023, 12, 1).unwrap();

    let labels = periods(&repo.query_range(&filter).unwrap());
    assert_eq!(labels, vec!["2022-12", "2023-01"]);
}

#[test]
fn same_year_boundary_clauses_are_ored() {
    // ys == ye: (month >= ms) OR (month <= me), which spans the whole year for ms > 1, me < 12.
    let repo = monthly_repo();
    let filter = PeriodFilter::validate("SBGRSBSV", 2022, 2022, 3, 5).unwrap();

    let outcome = repo.query_range(&filter).unwrap();
    assert_eq!(outcome.records().len(), 12);
    assert!(outcome.records().iter().all(|r| r.year == 2022));
}

#[test]
fn results_only_contain_requested_market() {
    let mut repo = monthly_repo();
    repo.append(&[rec(2022, 6, "SBFLSBGR", 1.0), rec(2022, 7, "SBFLSBGR", 2.0)])
        .unwrap();

    let filter = PeriodFilter::full_years("SBFLSBGR", 2021, 2023).unwrap();
    let outcome = repo.query_range(&filter).unwrap();

    assert_eq!(periods(&outcome), vec!["2022-06", "2022-07"]);
    assert!(outcome.records().iter().all(|r| r.market == "SBFLSBGR"));
}

#[test]
fn non_numeric_rpk_reads_as_zero() {
    let repo = FlightRepository::open_in_memory().unwrap();
    repo.connection()
        .execute_batch(
            "INSERT INTO flight_data (ANO, MES, MERCADO, RPK, ASK) VALUES
                (2023, 1, 'SBGRSBSV', 'n/d', 'x'),
                (2023, 2, 'SBGRSBSV', NULL, NULL),
                (2023, 3, 'SBGRSBSV', '3000', 4000);",
        )
        .unwrap();

    let filter = PeriodFilter::full_years("SBGRSBSV", 2023, 2023).unwrap();
    let records = repo.query_range(&filter).unwrap().into_records();

    let rpks: Vec<f64> = records.iter().map(|r| r.rpk).collect();
    assert_eq!(rpks, vec![0.0, 0.0, 3000.0]);
    assert_eq!(records[0].ask, None);
    assert_eq!(records[2].ask, Some(4000.0));
}

#[test]
fn legacy_table_without_ask_is_migrated() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE flight_data (ANO BIGINT, MES BIGINT, MERCADO TEXT, RPK BIGINT);
         INSERT INTO flight_data VALUES (2023, 1, 'SBGRSBSV', 1000);
         INSERT INTO flight_data VALUES (2023, 2, 'SBGRSBSV', 2000);
         INSERT INTO flight_data VALUES (2024, 1, 'SBFLSBGR', 1500);",
    )
    .unwrap();

    let repo = FlightRepository::from_connection(conn).unwrap();
    let filter = PeriodFilter::validate("SBGRSBSV", 2023, 2023, 1, 2).unwrap();
    let records = repo.query_range(&filter).unwrap().into_records();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].rpk, 2000.0);
    assert!(records.iter().all(|r| r.ask.is_none()));
}

#[test]
fn market_coverage_lists_years_and_months() {
    let repo = scenario_repo();
    assert_eq!(
        repo.market_coverage("SBGRSBSV").unwrap(),
        MarketCoverage {
            years: vec![2023],
            months: vec![1, 2],
        }
    );
    assert_eq!(repo.market_coverage("NONE").unwrap(), MarketCoverage::default());
}

#[test]
fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_stats.db");
    {
        let mut repo = FlightRepository::open(&path).unwrap();
        repo.replace(&[rec(2023, 1, "SBGRSBSV", 1000.0)]).unwrap();
    }

    let repo = FlightRepository::open(&path).unwrap();
    assert_eq!(repo.list_markets().unwrap(), vec!["SBGRSBSV"]);
    assert!(repo.has_market("SBGRSBSV").unwrap());
    assert!(!repo.has_market("SBGR").unwrap());
}
