use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::{ContributionSchedule, FeeSchedule};
use crate::error::DcaError;
use crate::series::{PriceSeries, ReturnPoint, ReturnSeries};
use crate::DcaResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Net portfolio value at one valid price sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// Index of the sample in the source price series.
    pub period_index: usize,
    pub date: NaiveDate,
    pub net_value: f64,
    /// Cash added at this sample; the initial amount on the first point.
    #[serde(default)]
    pub contribution: f64,
}

/// Ordered net values, one per valid price sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValuePath {
    pub points: Vec<ValuePoint>,
}

impl ValuePath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.net_value).collect()
    }

    pub fn first(&self) -> Option<&ValuePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ValuePoint> {
        self.points.last()
    }

    /// The most recent `n` points (all of them if `n` exceeds the length).
    pub fn tail(&self, n: usize) -> &[ValuePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Period-over-period fractional returns; one shorter than the path.
    ///
    /// A contribution made at a sample counts as invested at the start of
    /// that period, so `r = v[i] / (v[i-1] + c[i]) - 1`. Without
    /// contributions this is `(v[i] - v[i-1]) / v[i-1]`.
    pub fn returns(&self) -> DcaResult<ReturnSeries> {
        let mut points = Vec::with_capacity(self.points.len().saturating_sub(1));
        for w in self.points.windows(2) {
            let prev = w[0].net_value;
            let base = prev + w[1].contribution;
            if prev <= 0.0 || base <= 0.0 {
                return Err(DcaError::FinancialImpossibility(format!(
                    "portfolio value reached {prev} on {}, returns are undefined",
                    w[0].date
                )));
            }
            points.push(ReturnPoint {
                date: w[1].date,
                value: w[1].net_value / base - 1.0,
            });
        }
        Ok(ReturnSeries { points })
    }
}

/// Everything produced by one accumulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulationResult {
    pub value_path: ValuePath,
    /// Initial amount plus every periodic contribution actually made.
    pub total_invested: f64,
    pub final_units: f64,
    /// Periodic contributions made after the initial one.
    pub contributions_made: usize,
    /// Samples ignored because their price was not positive.
    pub skipped_samples: usize,
    /// True when the contribution stride never fits inside the priced window,
    /// so only the initial amount was invested.
    pub stride_exceeds_series: bool,
}

impl AccumulationResult {
    pub fn final_value(&self) -> f64 {
        self.value_path.last().map_or(0.0, |p| p.net_value)
    }

    /// `(final - invested) / invested`, in percent.
    pub fn total_return_pct(&self) -> f64 {
        if self.total_invested <= 0.0 {
            return 0.0;
        }
        (self.final_value() - self.total_invested) / self.total_invested * 100.0
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Replay a contribution schedule against a price series.
///
/// Units start at `initial_amount / first_price`. Every `stride` samples after
/// the first valid one, `periodic_amount / price` units are bought. At every
/// valid sample the fee drag for one month is taken out of the gross value
/// and the unit count is re-derived from the net value, so fees compound
/// into future holdings. Samples with a non-positive price are skipped.
pub fn simulate(
    prices: &PriceSeries,
    schedule: &ContributionSchedule,
    fees: &FeeSchedule,
) -> DcaResult<AccumulationResult> {
    schedule.validate()?;
    fees.validate()?;

    let valid = prices.valid_len();
    if valid < 2 {
        return Err(DcaError::InsufficientHistory(format!(
            "at least 2 positive price samples required, got {valid}"
        )));
    }

    let points = prices.points();
    let first_idx = points.iter().position(|p| p.is_valid()).ok_or_else(|| {
        DcaError::InsufficientHistory("price series has no positive sample".into())
    })?;
    let last_idx = points.iter().rposition(|p| p.is_valid()).unwrap_or(first_idx);

    let stride = schedule.frequency.stride();
    let retention = fees.retention_factor();

    let mut units = schedule.initial_amount / points[first_idx].price;
    let mut total_invested = schedule.initial_amount;
    let mut contributions_made = 0usize;
    let mut path = Vec::with_capacity(valid);

    for (i, p) in points.iter().enumerate().skip(first_idx) {
        if !p.is_valid() {
            continue;
        }

        let offset = i - first_idx;
        let mut contribution = if offset == 0 { schedule.initial_amount } else { 0.0 };
        if offset > 0 && offset % stride == 0 && schedule.periodic_amount > 0.0 {
            units += schedule.periodic_amount / p.price;
            total_invested += schedule.periodic_amount;
            contributions_made += 1;
            contribution = schedule.periodic_amount;
        }

        let gross = units * p.price;
        let net = gross * retention;
        if !net.is_finite() || net < 0.0 {
            return Err(DcaError::FinancialImpossibility(format!(
                "net value {net} on {} is not a valid portfolio value",
                p.date
            )));
        }
        units = net / p.price;

        path.push(ValuePoint {
            period_index: i,
            date: p.date,
            net_value: net,
            contribution,
        });
    }

    if path.len() < 2 {
        return Err(DcaError::InsufficientHistory(format!(
            "value path has {} points, at least 2 required",
            path.len()
        )));
    }

    let skipped_samples = points.len() - valid;
    let result = AccumulationResult {
        value_path: ValuePath { points: path },
        total_invested,
        final_units: units,
        contributions_made,
        skipped_samples,
        stride_exceeds_series: stride > last_idx - first_idx,
    };

    tracing::debug!(
        samples = points.len(),
        skipped = skipped_samples,
        contributions = contributions_made,
        total_invested,
        final_value = result.final_value(),
        "accumulation complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulation::schedule::Frequency;
    use crate::series::PricePoint;

    fn monthly(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let year = 2020 + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                PricePoint::new(NaiveDate::from_ymd_opt(year, month, 1).unwrap(), p)
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_lump_sum_tracks_price() {
        let prices = monthly(&[100.0, 120.0, 90.0, 150.0]);
        let schedule = ContributionSchedule::lump_sum(1000.0);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        let values = out.value_path.values();
        assert_eq!(values.len(), 4);
        for (v, p) in values.iter().zip([100.0, 120.0, 90.0, 150.0]) {
            assert!((v - 1000.0 * p / 100.0).abs() < 1e-9);
        }
        assert_eq!(out.total_invested, 1000.0);
        assert_eq!(out.contributions_made, 0);
    }

    #[test]
    fn test_monthly_contributions_constant_price() {
        let prices = monthly(&[100.0; 12]);
        let schedule = ContributionSchedule::new(1000.0, 100.0, Frequency::Monthly);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        assert!((out.final_units - 21.0).abs() < 1e-9);
        assert!((out.final_value() - 2100.0).abs() < 1e-9);
        assert!((out.total_invested - 2100.0).abs() < 1e-9);
        assert_eq!(out.contributions_made, 11);
    }

    #[test]
    fn test_quarterly_stride() {
        let prices = monthly(&[100.0; 10]);
        let schedule = ContributionSchedule::new(1000.0, 100.0, Frequency::Quarterly);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        // offsets 3, 6, 9
        assert_eq!(out.contributions_made, 3);
        assert!((out.total_invested - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn test_stride_longer_than_series() {
        let prices = monthly(&[100.0, 110.0]);
        let schedule = ContributionSchedule::new(10_000.0, 500.0, Frequency::Annual);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        assert!(out.stride_exceeds_series);
        assert_eq!(out.contributions_made, 0);
        assert!((out.final_value() - 11_000.0).abs() < 1e-9);
        assert!((out.total_return_pct() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fee_compounds_into_units() {
        let prices = monthly(&[100.0, 100.0, 100.0]);
        let schedule = ContributionSchedule::lump_sum(1200.0);
        let fees = FeeSchedule::new(0.12);
        let out = simulate(&prices, &schedule, &fees).unwrap();
        // 1% drag per sample, applied at each of the 3 samples
        let expected = 1200.0 * 0.99f64.powi(3);
        assert!((out.final_value() - expected).abs() < 1e-9);
        assert!((out.final_units - expected / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_skips_invalid_samples() {
        let prices = monthly(&[100.0, 0.0, 110.0, -5.0, 121.0]);
        let schedule = ContributionSchedule::new(1000.0, 100.0, Frequency::Monthly);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        assert_eq!(out.value_path.len(), 3);
        assert_eq!(out.skipped_samples, 2);
        let idx: Vec<usize> = out.value_path.points.iter().map(|p| p.period_index).collect();
        assert_eq!(idx, vec![0, 2, 4]);
        // Contributions only on valid samples 2 and 4
        assert_eq!(out.contributions_made, 2);
    }

    #[test]
    fn test_leading_invalid_sample_shifts_origin() {
        let prices = monthly(&[0.0, 50.0, 100.0]);
        let schedule = ContributionSchedule::lump_sum(100.0);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        assert_eq!(out.value_path.first().unwrap().period_index, 1);
        assert!((out.final_value() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_insufficient() {
        let prices = monthly(&[100.0]);
        let schedule = ContributionSchedule::lump_sum(1000.0);
        let err = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap_err();
        assert!(matches!(err, DcaError::InsufficientHistory(_)));
    }

    #[test]
    fn test_only_one_valid_sample_insufficient() {
        let prices = monthly(&[0.0, 100.0, -1.0]);
        let schedule = ContributionSchedule::lump_sum(1000.0);
        assert!(matches!(
            simulate(&prices, &schedule, &FeeSchedule::none()),
            Err(DcaError::InsufficientHistory(_))
        ));
    }

    #[test]
    fn test_zero_initial_rejected() {
        let prices = monthly(&[100.0, 110.0]);
        let schedule = ContributionSchedule::new(0.0, 100.0, Frequency::Monthly);
        assert!(matches!(
            simulate(&prices, &schedule, &FeeSchedule::none()),
            Err(DcaError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_path_returns_length() {
        let prices = monthly(&[100.0, 110.0, 99.0]);
        let out =
            simulate(&prices, &ContributionSchedule::lump_sum(1.0), &FeeSchedule::none()).unwrap();
        let r = out.value_path.returns().unwrap();
        assert_eq!(r.len(), 2);
        assert!((r.points[0].value - 0.10).abs() < 1e-12);
        assert!((r.points[1].value + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_returns_net_of_contributions() {
        let prices = monthly(&[100.0; 6]);
        let schedule = ContributionSchedule::new(1000.0, 100.0, Frequency::Monthly);
        let out = simulate(&prices, &schedule, &FeeSchedule::none()).unwrap();
        let r = out.value_path.returns().unwrap();
        assert!(r.values().iter().all(|v| v.abs() < 1e-12));
        assert_eq!(out.value_path.points[0].contribution, 1000.0);
        assert_eq!(out.value_path.points[1].contribution, 100.0);
    }

    #[test]
    fn test_tail() {
        let prices = monthly(&[1.0, 2.0, 3.0, 4.0]);
        let out =
            simulate(&prices, &ContributionSchedule::lump_sum(1.0), &FeeSchedule::none()).unwrap();
        assert_eq!(out.value_path.tail(2).len(), 2);
        assert_eq!(out.value_path.tail(2)[0].period_index, 2);
        assert_eq!(out.value_path.tail(10).len(), 4);
    }
}
