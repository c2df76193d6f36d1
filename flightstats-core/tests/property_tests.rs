//! Property tests for ingestion and query invariants.
//!
//! Uses proptest to verify:
//! 1. Market keys are direction-independent
//! 2. Market and year listings are sorted and duplicate-free
//! 3. The SQL range query agrees with the in-process predicate, row for row
//! 4. Filter validation accepts exactly the ranges it documents

use proptest::prelude::*;
use flightstats_core::data::RecordSink;
use flightstats_core::domain::{market_key, FlightRecord, PeriodFilter};
use flightstats_core::store::{FlightRepository, QueryError};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_airport() -> impl Strategy<Value = String> {
    "[A-Z]{0,4}"
}

fn arb_market() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["SBFLSBGR", "SBGRSBSV", "SBKPSBPA", "SBBRSBSP"])
        .prop_map(String::from)
}

fn arb_record() -> impl Strategy<Value = FlightRecord> {
    (2018..2026_i32, 1..=12_u32, arb_market(), 0.0..1.0e9_f64).prop_map(
        |(year, month, market, rpk)| FlightRecord {
            year,
            month,
            market,
            rpk: rpk.round(),
            ask: None,
        },
    )
}

fn arb_records() -> impl Strategy<Value = Vec<FlightRecord>> {
    prop::collection::vec(arb_record(), 0..80)
}

fn load(records: &[FlightRecord]) -> FlightRepository {
    let mut repo = FlightRepository::open_in_memory().unwrap();
    repo.replace(records).unwrap();
    repo
}

// ── 1. Market key symmetry ───────────────────────────────────────────

proptest! {
    #[test]
    fn market_key_is_symmetric(a in arb_airport(), b in arb_airport()) {
        prop_assert_eq!(
            market_key(Some(&a), Some(&b)),
            market_key(Some(&b), Some(&a))
        );
    }

    #[test]
    fn market_key_is_sorted_concatenation(a in arb_airport(), b in arb_airport()) {
        let key = market_key(Some(&a), Some(&b));
        let (lo, hi) = if a <= b { (&a, &b) } else { (&b, &a) };
        prop_assert!(key.starts_with(lo.as_str()));
        prop_assert!(key.ends_with(hi.as_str()));
        prop_assert_eq!(key.len(), a.len() + b.len());
    }
}

// ── 2. Sorted, unique listings ───────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn listings_are_sorted_and_unique(records in arb_records()) {
        let repo = load(&records);

        let markets = repo.list_markets().unwrap();
        prop_assert!(markets.windows(2).all(|w| w[0] < w[1]));
        for r in &records {
            prop_assert!(markets.contains(&r.market));
        }

        let years = repo.list_years().unwrap();
        prop_assert!(years.windows(2).all(|w| w[0] < w[1]));
        for r in &records {
            prop_assert!(years.contains(&r.year));
        }
    }
}

// ── 3. Range query agrees with the predicate ─────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn range_query_matches_predicate(
        records in arb_records(),
        market in arb_market(),
        ys in 2017..2027_i32,
        span in 0..4_i32,
        ms in 1..=12_u32,
        me in 1..=12_u32,
    ) {
        let ye = ys + span;
        prop_assume!(ys != ye || me >= ms);
        let filter = PeriodFilter::validate(market.clone(), ys, ye, ms, me).unwrap();
        let repo = load(&records);

        let expected: Vec<FlightRecord> =
            records.iter().filter(|r| filter.matches(r)).cloned().collect();

        match repo.query_range(&filter) {
            Ok(outcome) => {
                prop_assert_eq!(outcome.records(), expected.as_slice());
                prop_assert_eq!(outcome.is_empty(), expected.is_empty());
            }
            Err(QueryError::UnknownMarket { .. }) => {
                prop_assert!(!records.iter().any(|r| r.market == market));
            }
            Err(e) => prop_assert!(false, "storage error: {}", e),
        }
    }
}

// ── 4. Validation boundaries ─────────────────────────────────────────

proptest! {
    #[test]
    fn validation_matches_invariants(
        ys in 2000..2030_i32,
        ye in 2000..2030_i32,
        ms in 1..=12_u32,
        me in 1..=12_u32,
    ) {
        let ok = PeriodFilter::validate("SBGRSBSV", ys, ye, ms, me).is_ok();
        let expected = ye >= ys && (ys != ye || me >= ms);
        prop_assert_eq!(ok, expected);
    }
}
