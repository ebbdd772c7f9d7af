use serde::{Deserialize, Serialize};

use crate::accumulation::ValuePath;
use crate::error::DcaError;
use crate::stats::{is_degenerate, max_drawdown, sample_std_dev};
use crate::DcaResult;

/// Value paths are sampled monthly.
pub const PERIODS_PER_YEAR: f64 = 12.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Risk and return ratios for one value path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualised standard deviation of period returns.
    pub volatility: f64,
    pub cagr: f64,
    pub total_return_pct: f64,
    pub sharpe: f64,
    /// Peak-to-trough decline of the value path, as a fraction.
    pub max_drawdown: f64,
    pub initial_value: f64,
    pub final_value: f64,
    pub total_invested: f64,
    /// Years used as the CAGR exponent base.
    pub elapsed_years: f64,
}

/// Derive volatility, CAGR, total return and Sharpe from a value path.
///
/// CAGR is measured over the calendar time between the first and last
/// valued samples; `duration_years` is only used if that span is empty.
/// A path with no dispersion reports a Sharpe ratio of 0.
pub fn analyze(
    path: &ValuePath,
    total_invested: f64,
    risk_free_rate: f64,
    duration_years: f64,
) -> DcaResult<RiskMetrics> {
    let (first, last) = match (path.first(), path.last()) {
        (Some(f), Some(l)) if path.len() >= 2 => (f, l),
        _ => {
            return Err(DcaError::InsufficientHistory(format!(
                "at least 2 valued periods required, got {}",
                path.len()
            )))
        }
    };

    if !total_invested.is_finite() || total_invested <= 0.0 {
        return Err(DcaError::invalid(
            "total_invested",
            "must be a positive amount",
        ));
    }
    if !risk_free_rate.is_finite() {
        return Err(DcaError::invalid("risk_free_rate", "must be a finite rate"));
    }

    let initial_value = first.net_value;
    let final_value = last.net_value;
    if initial_value <= 0.0 {
        return Err(DcaError::FinancialImpossibility(format!(
            "initial portfolio value {initial_value} must be positive"
        )));
    }

    let returns = path.returns()?.values();
    let volatility = if returns.len() < 2 {
        0.0
    } else {
        sample_std_dev(&returns) * PERIODS_PER_YEAR.sqrt()
    };

    let total_return_pct = (final_value - total_invested) / total_invested * 100.0;

    let elapsed = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    let elapsed_years = if elapsed > 0.0 {
        elapsed
    } else if duration_years.is_finite() && duration_years > 0.0 {
        duration_years
    } else {
        return Err(DcaError::invalid(
            "duration_years",
            "must be positive when the price series spans no time",
        ));
    };

    let cagr = (final_value / initial_value).powf(1.0 / elapsed_years) - 1.0;

    let sharpe = if is_degenerate(volatility) {
        0.0
    } else {
        (cagr - risk_free_rate) / volatility
    };

    let metrics = RiskMetrics {
        volatility,
        cagr,
        total_return_pct,
        sharpe,
        max_drawdown: max_drawdown(&path.values()),
        initial_value,
        final_value,
        total_invested,
        elapsed_years,
    };

    tracing::debug!(
        volatility,
        cagr,
        sharpe,
        total_return_pct,
        "performance metrics computed"
    );

    Ok(metrics)
}
