use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::series::ReturnSeries;
use crate::stats::{is_degenerate, mean, sample_std_dev};

/// Window length, in periods, of the rolling Sharpe series.
pub const ROLLING_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingSharpePoint {
    /// Date of the last period in the window.
    pub date: NaiveDate,
    pub sharpe: f64,
}

/// Per-period Sharpe ratio over a sliding window of `min(6, n)` returns.
///
/// Excess returns are measured against the monthly equivalent of the annual
/// risk-free rate. The ratio is not annualised. Windows with no dispersion
/// report 0.
pub fn rolling_sharpe(returns: &ReturnSeries, annual_risk_free_rate: f64) -> Vec<RollingSharpePoint> {
    let n = returns.len();
    if n == 0 {
        return Vec::new();
    }
    let window = ROLLING_WINDOW.min(n);
    let period_rf = (1.0 + annual_risk_free_rate).powf(1.0 / 12.0) - 1.0;

    let excess: Vec<f64> = returns.points.iter().map(|p| p.value - period_rf).collect();

    excess
        .windows(window)
        .zip(returns.points.iter().skip(window - 1))
        .map(|(w, end)| {
            let sd = sample_std_dev(w);
            let sharpe = if is_degenerate(sd) { 0.0 } else { mean(w) / sd };
            RollingSharpePoint {
                date: end.date,
                sharpe,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::ReturnPoint;

    fn series(values: &[f64]) -> ReturnSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ReturnPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(31 * i as i64),
                value: v,
            })
            .collect();
        ReturnSeries { points }
    }

    #[test]
    fn test_window_count() {
        let r = series(&[0.01, 0.02, -0.01, 0.03, 0.00, 0.01, 0.02, -0.02]);
        let out = rolling_sharpe(&r, 0.017);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date, r.points[5].date);
        assert_eq!(out[2].date, r.points[7].date);
    }

    #[test]
    fn test_short_series_uses_whole_length() {
        let r = series(&[0.01, 0.03, 0.02]);
        let out = rolling_sharpe(&r, 0.0);
        assert_eq!(out.len(), 1);
        let expected = mean(&[0.01, 0.03, 0.02]) / sample_std_dev(&[0.01, 0.03, 0.02]);
        assert!((out[0].sharpe - expected).abs() < 1e-9);
    }

    #[test]
    fn test_flat_window_is_zero() {
        let r = series(&[0.0; 8]);
        let out = rolling_sharpe(&r, 0.02);
        assert!(out.iter().all(|p| p.sharpe == 0.0));
    }

    #[test]
    fn test_excess_over_monthly_rate() {
        let r = series(&[0.01, 0.02, 0.015, 0.03, 0.005, 0.02]);
        let rf = 0.05;
        let period_rf = 1.05f64.powf(1.0 / 12.0) - 1.0;
        let excess: Vec<f64> = r.values().iter().map(|v| v - period_rf).collect();
        let out = rolling_sharpe(&r, rf);
        assert!((out[0].sharpe - mean(&excess) / sample_std_dev(&excess)).abs() < 1e-9);
    }

    #[test]
    fn test_empty() {
        assert!(rolling_sharpe(&ReturnSeries::default(), 0.02).is_empty());
    }
}
