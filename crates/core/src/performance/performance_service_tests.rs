//! Unit tests for the performance service.

use super::*;
use crate::errors::{Error, Result};
use crate::history::{
    HistoryRepositoryTrait, InMemoryHistoryRepository, Instrument, PricePoint,
};
use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn steady_grower() -> Instrument {
    Instrument::new(
        "^TAIEX",
        "Taiwan weighted total-return index",
        vec![
            PricePoint::new(d(2020, 1, 2), dec!(100)),
            PricePoint::new(d(2020, 7, 1), dec!(104)),
            PricePoint::new(d(2021, 1, 4), dec!(110)),
            PricePoint::new(d(2021, 7, 1), dec!(116)),
            PricePoint::new(d(2022, 1, 3), dec!(121)),
        ],
    )
}

fn late_incepted() -> Instrument {
    Instrument::new(
        "00631L",
        "Daily 2x leveraged ETF",
        vec![
            PricePoint::new(d(2021, 6, 1), dec!(50)),
            PricePoint::new(d(2021, 12, 1), dec!(55)),
            PricePoint::new(d(2022, 1, 3), dec!(60)),
        ],
    )
}

fn broken() -> Instrument {
    // Duplicate dates violate the store contract.
    Instrument::new(
        "BROKEN",
        "Corrupted feed",
        vec![
            PricePoint::new(d(2020, 1, 2), dec!(100)),
            PricePoint::new(d(2020, 1, 2), dec!(101)),
        ],
    )
}

fn service_with(instruments: Vec<Instrument>) -> PerformanceService<InMemoryHistoryRepository> {
    let repository = InMemoryHistoryRepository::new(instruments).unwrap();
    PerformanceService::new(Arc::new(repository))
}

#[test]
fn computes_the_full_metric_set_for_one_instrument() {
    let service = service_with(vec![steady_grower()]);
    let performance = service.calculate_instrument("^TAIEX").unwrap();

    assert_eq!(performance.period_start_date, d(2020, 1, 2));
    assert_eq!(performance.period_end_date, d(2022, 1, 3));
    assert_eq!(performance.total_return, dec!(0.21));
    assert!(performance.annualized_irr.is_some());
    assert!(performance.regular_plan_irr.is_some());
    // Inception year 2020 has a measurable span: 100 -> 104.
    assert_eq!(
        performance.yearly_returns.get(&2020).copied().flatten(),
        Some(dec!(0.04))
    );
    // 2021 runs from the prior year's last close: 104 -> 116.
    assert_eq!(
        performance.yearly_returns.get(&2021).copied().flatten(),
        Some((dec!(12) / dec!(104)).round_dp(9))
    );
}

#[test]
fn annualized_irr_agrees_with_annualized_total_return() {
    let service = service_with(vec![steady_grower()]);
    let performance = service.calculate_instrument("^TAIEX").unwrap();

    // For a buy-and-hold schedule both paths annualize the same ratio over
    // the same day count.
    let irr = performance.annualized_irr.unwrap().to_f64().unwrap();
    let annualized = performance.annualized_return.to_f64().unwrap();
    assert!((irr - annualized).abs() < 1e-6);
}

#[test]
fn one_broken_instrument_never_halts_the_others() {
    let service = service_with(vec![steady_grower(), broken(), late_incepted()]);
    let report = service.calculate_all().unwrap();

    assert_eq!(report.instruments.len(), 2);
    assert!(report.get("^TAIEX").is_some());
    assert!(report.get("00631L").is_some());
    assert!(report.failures.contains_key("BROKEN"));
    assert!(report.failures["BROKEN"].contains("Invalid price history"));
}

#[test]
fn pre_listing_years_are_absent_not_zero() {
    let service = service_with(vec![steady_grower(), late_incepted()]);
    let report = service.calculate_all().unwrap();

    let late = report.get("00631L").unwrap();
    // 2020 is inside the report span but before this instrument listed.
    assert_eq!(late.yearly_returns.get(&2020), Some(&None));
    assert!(late.yearly_returns[&2022].is_some());

    assert_eq!(report.period_start_date, Some(d(2020, 1, 2)));
    assert_eq!(report.period_end_date, Some(d(2022, 1, 3)));
}

#[test]
fn report_span_override_widens_the_yearly_maps() {
    let repository = InMemoryHistoryRepository::new(vec![steady_grower()]).unwrap();
    let options = EngineOptions {
        report_span: Some((d(2018, 1, 1), d(2022, 12, 31))),
        ..EngineOptions::default()
    };
    let service = PerformanceService::with_options(Arc::new(repository), options);

    let report = service.calculate_all().unwrap();
    assert_eq!(report.period_start_date, Some(d(2018, 1, 1)));
    assert_eq!(report.period_end_date, Some(d(2022, 12, 31)));

    let taiex = report.get("^TAIEX").unwrap();
    // The instrument only listed in 2020; the earlier report years are
    // present in the map but absent in value.
    assert_eq!(taiex.yearly_returns.get(&2018), Some(&None));
    assert_eq!(taiex.yearly_returns.get(&2019), Some(&None));
    assert!(taiex.yearly_returns[&2021].is_some());
}

#[test]
fn report_span_clips_every_metric_to_the_window() {
    let long_listed = Instrument::new(
        "LONG",
        "Listed well before the report window",
        vec![
            PricePoint::new(d(2018, 1, 2), dec!(50)),
            PricePoint::new(d(2020, 1, 2), dec!(100)),
            PricePoint::new(d(2021, 1, 4), dec!(110)),
            PricePoint::new(d(2022, 1, 3), dec!(121)),
        ],
    );
    let repository = InMemoryHistoryRepository::new(vec![long_listed]).unwrap();
    let options = EngineOptions {
        report_span: Some((d(2020, 1, 1), d(2021, 12, 31))),
        ..EngineOptions::default()
    };
    let service = PerformanceService::with_options(Arc::new(repository), options);

    let report = service.calculate_all().unwrap();
    let clipped = report.get("LONG").unwrap();

    // The 2018 point and the 2022 point fall outside the window, so the
    // measured period and every metric run 100 -> 110, not 50 -> 121.
    assert_eq!(clipped.period_start_date, d(2020, 1, 2));
    assert_eq!(clipped.period_end_date, d(2021, 1, 4));
    assert_eq!(clipped.total_return, dec!(0.1));
    assert!(!clipped.yearly_returns.contains_key(&2018));
    assert!(!clipped.yearly_returns.contains_key(&2022));
    assert_eq!(
        clipped.yearly_returns.get(&2021).copied().flatten(),
        Some(dec!(0.1))
    );
    // 2020 holds only the window's seed point: no measurable span.
    assert_eq!(clipped.yearly_returns.get(&2020), Some(&None));
}

#[test]
fn unknown_symbol_is_a_repository_error() {
    let service = service_with(vec![steady_grower()]);
    assert!(matches!(
        service.calculate_instrument("NOPE"),
        Err(Error::Repository(_))
    ));
}

#[test]
fn single_point_history_fails_that_instrument_only() {
    let stub = Instrument::new(
        "STUB",
        "Listed yesterday",
        vec![PricePoint::new(d(2022, 1, 3), dec!(10))],
    );
    let service = service_with(vec![stub, steady_grower()]);
    let report = service.calculate_all().unwrap();

    assert!(report.failures.contains_key("STUB"));
    assert_eq!(report.instruments.len(), 1);
}

struct CountingRepository {
    inner: InMemoryHistoryRepository,
    fetches: AtomicUsize,
}

impl HistoryRepositoryTrait for CountingRepository {
    fn get_history(&self, symbol: &str) -> Result<Vec<PricePoint>> {
        self.inner.get_history(symbol)
    }

    fn get_instrument(&self, symbol: &str) -> Result<Instrument> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.get_instrument(symbol)
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        self.inner.list_instruments()
    }
}

#[test]
fn results_are_memoized_within_a_run() {
    let repository = CountingRepository {
        inner: InMemoryHistoryRepository::new(vec![steady_grower()]).unwrap(),
        fetches: AtomicUsize::new(0),
    };
    let repository = Arc::new(repository);
    let service = PerformanceService::new(repository.clone());

    let first = service.calculate_instrument("^TAIEX").unwrap();
    let second = service.calculate_instrument("^TAIEX").unwrap();
    assert_eq!(first, second);
    assert_eq!(repository.fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn report_serializes_with_camel_case_keys() {
    let service = service_with(vec![steady_grower()]);
    let report = service.calculate_all().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let entry = &json["instruments"][0];
    assert_eq!(entry["symbol"], "^TAIEX");
    assert!(entry.get("totalReturn").is_some());
    assert!(entry.get("annualizedIrr").is_some());
    assert!(entry.get("regularPlanIrr").is_some());
    assert!(entry.get("yearlyReturns").is_some());
    // Absent years serialize as null, not 0.
    let report_value = serde_json::to_value(&report).unwrap();
    assert!(report_value["failures"].is_object());
}

#[test]
fn flat_instrument_reports_exact_zeroes() {
    let flat = Instrument::new(
        "FLAT",
        "Goes nowhere",
        vec![
            PricePoint::new(d(2020, 1, 2), dec!(100)),
            PricePoint::new(d(2022, 1, 3), dec!(100)),
        ],
    );
    let service = service_with(vec![flat]);
    let performance = service.calculate_instrument("FLAT").unwrap();

    assert_eq!(performance.total_return, Decimal::ZERO);
    assert_eq!(performance.annualized_return, Decimal::ZERO);
    assert_eq!(performance.annualized_irr, Some(Decimal::ZERO));
}
