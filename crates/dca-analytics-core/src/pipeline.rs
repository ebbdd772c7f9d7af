//! Request-level entry points.
//!
//! Each function validates a request, runs the engine components in order
//! and wraps the result in a [`ComputationOutput`] envelope.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::accumulation::{simulate, AccumulationResult, ValuePath};
use crate::assumptions::AssetClassTable;
use crate::error::DcaError;
use crate::performance::{
    analyze, rolling_sharpe, RiskMetrics, RollingSharpePoint, PERIODS_PER_YEAR, ROLLING_WINDOW,
};
use crate::request::{PlanAssumptions, SimulationRequest};
use crate::series::{PriceSeries, ReturnSeries};
use crate::types::{with_metadata, ComputationOutput};
use crate::DcaResult;

#[cfg(feature = "benchmark")]
use crate::benchmark::{compare, BenchmarkComparison};
#[cfg(feature = "forecast")]
use crate::forecast::{forecast, TrendModel};
#[cfg(feature = "strategies")]
use crate::strategies::{compare_strategies, StrategyComparison};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub inputs: SimulationRequest,
    pub assumptions: PlanAssumptions,
    pub total_invested: f64,
    pub final_value: f64,
    pub final_units: f64,
    pub value_path: ValuePath,
    pub returns: ReturnSeries,
    pub metrics: RiskMetrics,
    pub rolling_sharpe: Vec<RollingSharpePoint>,
}

#[cfg(feature = "benchmark")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub assumptions: PlanAssumptions,
    pub portfolio_total_invested: f64,
    pub portfolio_final_value: f64,
    pub comparison: BenchmarkComparison,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Restrict to the requested calendar window. Without any year bound the
/// plan covers the trailing `duration_years` of the series. No samples at all
/// means the data source had nothing for the request.
fn windowed(
    prices: &PriceSeries,
    request: &SimulationRequest,
    duration_years: f64,
    label: &str,
) -> DcaResult<PriceSeries> {
    let window = if request.start_year.is_none() && request.end_year.is_none() {
        let months = (duration_years * PERIODS_PER_YEAR).round().max(1.0) as u32;
        prices.trailing_months(months)
    } else {
        prices.between_years(request.start_year, request.end_year)
    };
    if window.is_empty() {
        return Err(DcaError::UpstreamDataUnavailable(format!(
            "{label} price series has no samples in the requested window"
        )));
    }
    Ok(window)
}

/// Log and describe non-positive samples dropped from the `label` series.
fn skipped_samples_warning(skipped: usize, label: &str) -> Option<String> {
    if skipped == 0 {
        return None;
    }
    tracing::warn!(skipped, series = label, "non-positive price samples skipped");
    Some(format!(
        "{skipped} {label} price sample(s) with a non-positive price were skipped"
    ))
}

#[cfg(any(feature = "benchmark", feature = "forecast", feature = "strategies"))]
fn series_skipped(prices: &PriceSeries) -> usize {
    prices.len() - prices.valid_len()
}

fn accumulation_warnings(run: &AccumulationResult, label: &str, periodic_amount: f64) -> Vec<String> {
    let mut warnings: Vec<String> = skipped_samples_warning(run.skipped_samples, label)
        .into_iter()
        .collect();
    if run.stride_exceeds_series && periodic_amount > 0.0 {
        warnings.push(format!(
            "{label} series is shorter than one contribution interval; only the initial amount was invested"
        ));
    }
    warnings
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Simulate a DCA plan and derive its risk metrics.
pub fn run_simulation(
    request: &SimulationRequest,
    prices: &PriceSeries,
    table: &AssetClassTable,
) -> DcaResult<ComputationOutput<SimulationReport>> {
    let start = Instant::now();
    let assumptions = request.resolve(table)?;
    let window = windowed(prices, request, assumptions.duration_years, "portfolio")?;

    let run = simulate(&window, &assumptions.schedule, &assumptions.fees)?;
    let warnings = accumulation_warnings(&run, "portfolio", assumptions.schedule.periodic_amount);

    let metrics = analyze(
        &run.value_path,
        run.total_invested,
        assumptions.risk_free_rate,
        assumptions.duration_years,
    )?;
    let returns = run.value_path.returns()?;
    let rolling = rolling_sharpe(&returns, assumptions.risk_free_rate);

    let report = SimulationReport {
        inputs: request.clone(),
        total_invested: run.total_invested,
        final_value: run.final_value(),
        final_units: run.final_units,
        value_path: run.value_path,
        returns,
        metrics,
        rolling_sharpe: rolling,
        assumptions,
    };

    Ok(with_metadata(
        "DCA accumulation with monthly fee drag; annualised volatility, CAGR, Sharpe",
        &serde_json::json!({
            "samples": window.len(),
            "asset_class": report.assumptions.asset_class,
            "annual_fee_rate": report.assumptions.fees.annual_fee_rate,
            "risk_free_rate": report.assumptions.risk_free_rate,
            "rolling_window": ROLLING_WINDOW,
        }),
        warnings,
        elapsed_us(start),
        report,
    ))
}

/// Simulate the plan on both the portfolio and a fee-free benchmark.
#[cfg(feature = "benchmark")]
pub fn run_benchmark(
    request: &SimulationRequest,
    portfolio_prices: &PriceSeries,
    benchmark_prices: &PriceSeries,
    table: &AssetClassTable,
) -> DcaResult<ComputationOutput<BenchmarkReport>> {
    let start = Instant::now();
    let assumptions = request.resolve(table)?;
    let portfolio_window =
        windowed(portfolio_prices, request, assumptions.duration_years, "portfolio")?;
    let benchmark_window =
        windowed(benchmark_prices, request, assumptions.duration_years, "benchmark")?;

    let run = simulate(&portfolio_window, &assumptions.schedule, &assumptions.fees)?;
    let mut warnings = accumulation_warnings(&run, "portfolio", assumptions.schedule.periodic_amount);
    warnings.extend(skipped_samples_warning(
        series_skipped(&benchmark_window),
        "benchmark",
    ));

    let comparison = compare(
        &run.value_path,
        &benchmark_window,
        &assumptions.schedule,
        run.total_return_pct(),
    )?;

    let report = BenchmarkReport {
        portfolio_total_invested: run.total_invested,
        portfolio_final_value: run.final_value(),
        comparison,
        assumptions,
    };

    Ok(with_metadata(
        "Fee-free benchmark accumulation, right-aligned on the overlapping window",
        &serde_json::json!({
            "instrument_id": report.assumptions.instrument_id,
            "benchmark_id": report.assumptions.benchmark_id,
            "verdict_threshold_pct": crate::benchmark::VERDICT_THRESHOLD_PCT,
        }),
        warnings,
        elapsed_us(start),
        report,
    ))
}

/// Fit and project a linear trend on the price returns of a series.
#[cfg(feature = "forecast")]
pub fn run_forecast(
    prices: &PriceSeries,
    periods_ahead: usize,
    confidence: f64,
) -> DcaResult<ComputationOutput<TrendModel>> {
    let start = Instant::now();
    let returns = prices.returns();
    let model = forecast(&returns, periods_ahead, confidence)?;

    let warnings: Vec<String> = skipped_samples_warning(series_skipped(prices), "input")
        .into_iter()
        .collect();

    Ok(with_metadata(
        "OLS trend on percentage returns; Student-t interval on the mean projection",
        &serde_json::json!({
            "observations": model.observations,
            "periods_ahead": periods_ahead,
            "confidence": confidence,
        }),
        warnings,
        elapsed_us(start),
        model,
    ))
}

/// Lump sum against DCA at every supported frequency.
#[cfg(feature = "strategies")]
pub fn run_strategy_comparison(
    prices: &PriceSeries,
    total_capital: f64,
) -> DcaResult<ComputationOutput<StrategyComparison>> {
    let start = Instant::now();
    let comparison = compare_strategies(prices, total_capital)?;

    let warnings: Vec<String> = skipped_samples_warning(series_skipped(prices), "input")
        .into_iter()
        .collect();

    Ok(with_metadata(
        "Lump sum vs. evenly split DCA at monthly, quarterly, semiannual and annual strides",
        &serde_json::json!({
            "total_capital": total_capital,
            "samples": comparison.series.len(),
        }),
        warnings,
        elapsed_us(start),
        comparison,
    ))
}
