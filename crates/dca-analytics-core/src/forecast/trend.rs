use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::DcaError;
use crate::series::ReturnSeries;
use crate::stats::{mean, sample_std_dev};
use crate::DcaResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Smallest return sample a linear fit is run on.
pub const MIN_OBSERVATIONS: usize = 10;
pub const DEFAULT_PERIODS_AHEAD: usize = 12;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
/// Longest projection accepted, in periods (50 years of monthly data).
pub const MAX_PERIODS_AHEAD: usize = 600;

const FLAT_SLOPE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Upward,
    Downward,
    Flat,
}

/// An observed return next to its fitted trend value, both in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: usize,
    pub date: NaiveDate,
    pub observed_pct: f64,
    pub fitted_pct: f64,
}

/// A projected return, in percent, for a period after the sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: usize,
    pub predicted_pct: f64,
}

/// Interval on the mean of the projected returns, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
    pub t_critical: f64,
    pub standard_error: f64,
}

/// Dispersion bands of the observed returns, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaBands {
    pub one_sigma: f64,
    pub two_sigma: f64,
    pub three_sigma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// Drift of the return trend per period, in percentage points.
    pub slope: f64,
    pub intercept: f64,
    /// Sample standard deviation of the fit residuals, in percent.
    pub residual_std: f64,
    pub observations: usize,
    pub historical: Vec<TrendPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub confidence_interval: ConfidenceInterval,
    pub mean_historical_return_pct: f64,
    pub mean_predicted_return_pct: f64,
    pub sigma_bands: SigmaBands,
    pub direction: TrendDirection,
}

impl TrendModel {
    pub fn fitted_values(&self) -> Vec<f64> {
        self.historical.iter().map(|p| p.fitted_pct).collect()
    }

    pub fn predicted_values(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.predicted_pct).collect()
    }
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// Ordinary least squares of `y` on `0..n`; returns `(slope, intercept)`.
fn ols_on_index(y: &[f64]) -> (f64, f64) {
    let n = y.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (yi - y_mean);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    (slope, y_mean - slope * x_mean)
}

/// Fit a linear trend to percentage returns and project it forward.
///
/// The confidence interval is built around the mean of the projected points
/// with a Student-t critical value on `n - 1` degrees of freedom and a
/// standard error of `residual_std / sqrt(n)`. It does not widen with the
/// forecast horizon.
pub fn forecast(
    returns: &ReturnSeries,
    periods_ahead: usize,
    confidence: f64,
) -> DcaResult<TrendModel> {
    let n = returns.len();
    if n < MIN_OBSERVATIONS {
        return Err(DcaError::InsufficientHistory(format!(
            "at least {MIN_OBSERVATIONS} return observations required for a trend fit, got {n}"
        )));
    }
    if periods_ahead == 0 {
        return Err(DcaError::invalid("periods_ahead", "must be at least 1"));
    }
    if periods_ahead > MAX_PERIODS_AHEAD {
        return Err(DcaError::invalid(
            "periods_ahead",
            format!("must not exceed {MAX_PERIODS_AHEAD}, got {periods_ahead}"),
        ));
    }
    let horizon_end = n.checked_add(periods_ahead).ok_or_else(|| {
        DcaError::invalid("periods_ahead", "projection horizon overflows")
    })?;
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DcaError::invalid(
            "confidence",
            "must lie strictly between 0 and 1",
        ));
    }

    let y: Vec<f64> = returns.points.iter().map(|p| p.value * 100.0).collect();
    if y.iter().any(|v| !v.is_finite()) {
        return Err(DcaError::invalid("returns", "contains non-finite values"));
    }

    let (slope, intercept) = ols_on_index(&y);
    let fitted: Vec<f64> = (0..n).map(|i| intercept + slope * i as f64).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(o, f)| o - f).collect();
    let residual_std = sample_std_dev(&residuals);

    let forecast: Vec<ForecastPoint> = (n..horizon_end)
        .map(|period| ForecastPoint {
            period,
            predicted_pct: intercept + slope * period as f64,
        })
        .collect();
    let predicted: Vec<f64> = forecast.iter().map(|p| p.predicted_pct).collect();
    let predicted_mean = mean(&predicted);

    let dist = StudentsT::new(0.0, 1.0, (n - 1) as f64).map_err(|e| {
        DcaError::invalid("returns", format!("invalid Student-t parameters: {e}"))
    })?;
    let t_critical = dist.inverse_cdf(1.0 - (1.0 - confidence) / 2.0);
    let standard_error = residual_std / (n as f64).sqrt();
    let margin = t_critical * standard_error;

    let historical = returns
        .points
        .iter()
        .zip(y.iter().zip(&fitted))
        .enumerate()
        .map(|(period, (p, (obs, fit)))| TrendPoint {
            period,
            date: p.date,
            observed_pct: *obs,
            fitted_pct: *fit,
        })
        .collect();

    let sigma = sample_std_dev(&y);
    let direction = if slope > FLAT_SLOPE_EPSILON {
        TrendDirection::Upward
    } else if slope < -FLAT_SLOPE_EPSILON {
        TrendDirection::Downward
    } else {
        TrendDirection::Flat
    };

    tracing::debug!(
        observations = n,
        slope,
        residual_std,
        predicted_mean,
        margin,
        "trend forecast fitted"
    );

    Ok(TrendModel {
        slope,
        intercept,
        residual_std,
        observations: n,
        historical,
        forecast,
        confidence_interval: ConfidenceInterval {
            level: confidence,
            mean: predicted_mean,
            lower: predicted_mean - margin,
            upper: predicted_mean + margin,
            margin,
            t_critical,
            standard_error,
        },
        mean_historical_return_pct: mean(&y),
        mean_predicted_return_pct: predicted_mean,
        sigma_bands: SigmaBands {
            one_sigma: sigma,
            two_sigma: 2.0 * sigma,
            three_sigma: 3.0 * sigma,
        },
        direction,
    })
}
