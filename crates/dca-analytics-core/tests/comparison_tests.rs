use chrono::NaiveDate;
use dca_analytics_core::accumulation::{simulate, ContributionSchedule, FeeSchedule, Frequency};
use dca_analytics_core::assumptions::{AssetClass, AssetClassDefaults, AssetClassTable};
use dca_analytics_core::benchmark::{compare, Verdict};
use dca_analytics_core::pipeline::{run_benchmark, run_strategy_comparison};
use dca_analytics_core::request::SimulationRequest;
use dca_analytics_core::series::{PricePoint, PriceSeries};
use dca_analytics_core::strategies::{compare_strategies, Strategy};
use dca_analytics_core::DcaError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn monthly(start_year: i32, prices: &[f64]) -> PriceSeries {
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            PricePoint::new(
                NaiveDate::from_ymd_opt(start_year + (i / 12) as i32, (i % 12) as u32 + 1, 15)
                    .unwrap(),
                p,
            )
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

fn rising(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + 2.0 * i as f64).collect()
}

// ---------------------------------------------------------------------------
// Benchmark
// ---------------------------------------------------------------------------

#[test]
fn test_identical_fee_free_series_are_comparable() {
    let prices = monthly(2019, &rising(24));
    let schedule = ContributionSchedule::new(1000.0, 100.0, Frequency::Monthly);
    let run = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
    let cmp = compare(&run.value_path, &prices, &schedule, run.total_return_pct()).unwrap();
    assert!(cmp.gap_pct.abs() < 1e-9);
    assert_eq!(cmp.verdict, Verdict::Comparable);
    assert_eq!(cmp.aligned_series.len(), 24);
}

#[test]
fn test_benchmark_pipeline_with_fees_underperforms() {
    let mut entries = BTreeMap::new();
    entries.insert(
        AssetClass::Equities,
        AssetClassDefaults::new(dec!(0.25), dec!(0.015), "ACWI"),
    );
    let table = AssetClassTable::new(entries);

    let mut request = SimulationRequest::new(dec!(5000), dec!(200), Frequency::Monthly);
    request.asset_class = AssetClass::Equities;
    request.duration_years = Some(dec!(3));

    let prices = monthly(2018, &rising(36));
    let out = run_benchmark(&request, &prices, &prices, &table).unwrap();
    let cmp = &out.result.comparison;
    assert!(cmp.gap_pct < -1.0);
    assert_eq!(cmp.verdict, Verdict::Underperformed);
    assert_eq!(out.result.assumptions.benchmark_id, "ACWI");
}

#[test]
fn test_benchmark_overlap_too_short() {
    let portfolio = monthly(2020, &rising(12));
    let schedule = ContributionSchedule::lump_sum(1000.0);
    let run = simulate(&portfolio, &schedule, &FeeSchedule::none()).unwrap();
    let benchmark = monthly(2020, &[100.0]);
    assert!(matches!(
        compare(&run.value_path, &benchmark, &schedule, run.total_return_pct()),
        Err(DcaError::InsufficientOverlap { .. })
    ));
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[test]
fn test_rising_market_favours_lump_sum() {
    let prices = monthly(2015, &rising(60));
    let cmp = compare_strategies(&prices, 12_000.0).unwrap();
    assert_eq!(cmp.best_strategy, Strategy::LumpSum);
    assert_eq!(cmp.returns.len(), 5);
    assert_eq!(cmp.series.len(), 60);
}

#[test]
fn test_falling_market_favours_dca() {
    let falling: Vec<f64> = (0..48).map(|i| 200.0 - 3.0 * i as f64).collect();
    let prices = monthly(2015, &falling);
    let cmp = compare_strategies(&prices, 10_000.0).unwrap();
    assert_ne!(cmp.best_strategy, Strategy::LumpSum);
    let lump = cmp.return_of(Strategy::LumpSum).unwrap();
    let monthly_dca = cmp.return_of(Strategy::DcaMonthly).unwrap();
    assert!(monthly_dca.return_pct > lump.return_pct);
}

#[test]
fn test_constant_prices_all_strategies_break_even() {
    let prices = monthly(2020, &[50.0; 24]);
    let out = run_strategy_comparison(&prices, 6000.0).unwrap();
    for r in &out.result.returns {
        assert!(r.return_pct.abs() < 1e-9, "{:?}", r.strategy);
        assert!((r.final_value - 6000.0).abs() < 1e-6);
    }
    assert!(out.result.average_return_pct.abs() < 1e-9);
}
