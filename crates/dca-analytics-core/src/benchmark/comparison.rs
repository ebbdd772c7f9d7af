use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accumulation::{simulate, ContributionSchedule, FeeSchedule, ValuePath};
use crate::error::DcaError;
use crate::series::{PricePoint, PriceSeries};
use crate::DcaResult;

/// Gap, in percentage points, beyond which one side clearly wins.
pub const VERDICT_THRESHOLD_PCT: f64 = 1.0;

const MIN_OVERLAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Outperformed,
    Underperformed,
    Comparable,
}

impl Verdict {
    pub fn from_gap(gap_pct: f64) -> Self {
        if gap_pct > VERDICT_THRESHOLD_PCT {
            Verdict::Outperformed
        } else if gap_pct < -VERDICT_THRESHOLD_PCT {
            Verdict::Underperformed
        } else {
            Verdict::Comparable
        }
    }
}

/// One period of the right-aligned portfolio / benchmark overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub portfolio_value: f64,
    pub benchmark_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub aligned_series: Vec<AlignedPoint>,
    pub portfolio_return_pct: f64,
    pub benchmark_return_pct: f64,
    /// Portfolio minus benchmark, in percentage points.
    pub gap_pct: f64,
    pub verdict: Verdict,
    pub benchmark_total_invested: f64,
    pub benchmark_final_value: f64,
}

/// Run the same schedule fee-free against a benchmark and compare returns.
///
/// Both sides are right-truncated to their common length so the comparison
/// is anchored on the most recent overlapping periods: the benchmark is
/// replayed from the start of that overlap, and its return covers only the
/// aligned window. Dates in the aligned series are taken from the portfolio
/// path.
pub fn compare(
    portfolio_path: &ValuePath,
    benchmark_prices: &PriceSeries,
    schedule: &ContributionSchedule,
    portfolio_return_pct: f64,
) -> DcaResult<BenchmarkComparison> {
    let benchmark_valid = benchmark_prices.valid_len();
    if portfolio_path.len() < MIN_OVERLAP || benchmark_valid < MIN_OVERLAP {
        return Err(DcaError::InsufficientOverlap {
            aligned: portfolio_path.len().min(benchmark_valid),
            required: MIN_OVERLAP,
        });
    }
    if !portfolio_return_pct.is_finite() {
        return Err(DcaError::invalid(
            "portfolio_return_pct",
            "must be a finite percentage",
        ));
    }

    let n = portfolio_path.len().min(benchmark_valid);

    // Replay the benchmark over its last `n` valid samples only, so its
    // return covers the same periods as the aligned series.
    let valid: Vec<PricePoint> = benchmark_prices
        .points()
        .iter()
        .filter(|p| p.is_valid())
        .copied()
        .collect();
    let overlap = PriceSeries::new(valid[valid.len() - n..].to_vec())?;
    let benchmark = simulate(&overlap, schedule, &FeeSchedule::none())?;
    let benchmark_return_pct = benchmark.total_return_pct();

    let aligned_series = portfolio_path
        .tail(n)
        .iter()
        .zip(benchmark.value_path.tail(n))
        .map(|(p, b)| AlignedPoint {
            date: p.date,
            portfolio_value: p.net_value,
            benchmark_value: b.net_value,
        })
        .collect();

    let gap_pct = portfolio_return_pct - benchmark_return_pct;
    let verdict = Verdict::from_gap(gap_pct);

    tracing::debug!(
        aligned = n,
        portfolio_return_pct,
        benchmark_return_pct,
        gap_pct,
        ?verdict,
        "benchmark comparison complete"
    );

    Ok(BenchmarkComparison {
        aligned_series,
        portfolio_return_pct,
        benchmark_return_pct,
        gap_pct,
        verdict,
        benchmark_total_invested: benchmark.total_invested,
        benchmark_final_value: benchmark.final_value(),
    })
}
