use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DcaError;
use crate::DcaResult;

/// A single priced sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Samples with a zero or negative price never enter a simulation.
    pub fn is_valid(&self) -> bool {
        self.price > 0.0
    }
}

/// Calendar bucket used when normalizing raw provider data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Monthly,
    Quarterly,
}

impl Resolution {
    fn bucket(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            Resolution::Monthly => (date.year(), date.month()),
            Resolution::Quarterly => (date.year(), (date.month() - 1) / 3),
        }
    }
}

/// Ordered price samples with strictly increasing dates.
///
/// Built once per request from resolved market data and never mutated.
/// Non-positive prices are kept as-is so that callers can see the gap; the
/// simulators skip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order dates and non-finite prices.
    pub fn new(points: Vec<PricePoint>) -> DcaResult<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.price.is_finite() {
                return Err(DcaError::invalid(
                    "prices",
                    format!("price on {} is not a finite number", p.date),
                ));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(DcaError::invalid(
                    "prices",
                    format!(
                        "dates must be strictly increasing ({} follows {})",
                        p.date,
                        points[i - 1].date
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    /// Sort raw observations by date, keeping the last one seen for a
    /// duplicated date.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> DcaResult<Self> {
        // Stable sort keeps input order among equal dates.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }
        Self::new(deduped)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of samples with a positive price.
    pub fn valid_len(&self) -> usize {
        self.points.iter().filter(|p| p.is_valid()).count()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Keep only samples whose calendar year lies in `[start_year, end_year]`.
    /// Either bound may be open.
    pub fn between_years(&self, start_year: Option<i32>, end_year: Option<i32>) -> PriceSeries {
        let points = self
            .points
            .iter()
            .filter(|p| start_year.map_or(true, |y| p.date.year() >= y))
            .filter(|p| end_year.map_or(true, |y| p.date.year() <= y))
            .copied()
            .collect();
        PriceSeries { points }
    }

    /// Keep the samples dated within `months` calendar months of the last
    /// sample; the cutoff itself is excluded.
    pub fn trailing_months(&self, months: u32) -> PriceSeries {
        let cutoff = self
            .last_date()
            .and_then(|last| last.checked_sub_months(Months::new(months)));
        match cutoff {
            Some(cutoff) => PriceSeries {
                points: self.points.iter().filter(|p| p.date > cutoff).copied().collect(),
            },
            None => self.clone(),
        }
    }

    /// Collapse to one sample per calendar month or quarter.
    ///
    /// The representative is the last valid observation in the bucket; a
    /// bucket with no valid observation keeps its last raw sample so the gap
    /// stays visible downstream instead of being filled.
    pub fn resample(&self, resolution: Resolution) -> PriceSeries {
        let mut out: Vec<PricePoint> = Vec::new();
        let mut current: Option<(i32, u32)> = None;

        for p in &self.points {
            let bucket = resolution.bucket(p.date);
            if current == Some(bucket) {
                if let Some(last) = out.last_mut() {
                    if p.is_valid() || !last.is_valid() {
                        *last = *p;
                    }
                }
            } else {
                out.push(*p);
                current = Some(bucket);
            }
        }
        PriceSeries { points: out }
    }

    /// Period-over-period price changes across valid samples.
    pub fn returns(&self) -> ReturnSeries {
        let valid: Vec<&PricePoint> = self.points.iter().filter(|p| p.is_valid()).collect();
        let points = valid
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: (w[1].price - w[0].price) / w[0].price,
            })
            .collect();
        ReturnSeries { points }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = DcaError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        PriceSeries::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// One fractional return, dated at the end of its period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Per-period fractional returns (0.01 = 1%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let points = vec![
            PricePoint::new(d(2020, 2, 1), 10.0),
            PricePoint::new(d(2020, 1, 1), 11.0),
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let points = vec![
            PricePoint::new(d(2020, 1, 1), 10.0),
            PricePoint::new(d(2020, 1, 1), 11.0),
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn test_rejects_nan_price() {
        let points = vec![PricePoint::new(d(2020, 1, 1), f64::NAN)];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn test_keeps_non_positive_prices() {
        let points = vec![
            PricePoint::new(d(2020, 1, 1), 10.0),
            PricePoint::new(d(2020, 2, 1), 0.0),
            PricePoint::new(d(2020, 3, 1), 12.0),
        ];
        let series = PriceSeries::new(points).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.valid_len(), 2);
    }

    #[test]
    fn test_from_unsorted_keeps_last_duplicate() {
        let points = vec![
            PricePoint::new(d(2020, 3, 1), 12.0),
            PricePoint::new(d(2020, 1, 1), 10.0),
            PricePoint::new(d(2020, 3, 1), 13.0),
        ];
        let series = PriceSeries::from_unsorted(points).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].price, 13.0);
    }

    #[test]
    fn test_resample_monthly_takes_last_valid() {
        let points = vec![
            PricePoint::new(d(2020, 1, 2), 10.0),
            PricePoint::new(d(2020, 1, 30), 11.0),
            PricePoint::new(d(2020, 1, 31), -1.0),
            PricePoint::new(d(2020, 2, 3), 12.0),
            PricePoint::new(d(2020, 2, 28), 12.5),
        ];
        let monthly = PriceSeries::new(points).unwrap().resample(Resolution::Monthly);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly.points()[0].price, 11.0);
        assert_eq!(monthly.points()[0].date, d(2020, 1, 30));
        assert_eq!(monthly.points()[1].price, 12.5);
    }

    #[test]
    fn test_resample_keeps_invalid_bucket_visible() {
        let points = vec![
            PricePoint::new(d(2020, 1, 2), 10.0),
            PricePoint::new(d(2020, 2, 3), 0.0),
            PricePoint::new(d(2020, 3, 3), 11.0),
        ];
        let monthly = PriceSeries::new(points).unwrap().resample(Resolution::Monthly);
        assert_eq!(monthly.len(), 3);
        assert!(!monthly.points()[1].is_valid());
    }

    #[test]
    fn test_resample_quarterly() {
        let points: Vec<PricePoint> = (1..=12)
            .map(|m| PricePoint::new(d(2021, m, 1), m as f64))
            .collect();
        let q = PriceSeries::new(points).unwrap().resample(Resolution::Quarterly);
        let prices: Vec<f64> = q.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_between_years_inclusive() {
        let points: Vec<PricePoint> = (2015..=2020)
            .map(|y| PricePoint::new(d(y, 6, 1), 1.0))
            .collect();
        let series = PriceSeries::new(points).unwrap();
        assert_eq!(series.between_years(Some(2016), Some(2018)).len(), 3);
        assert_eq!(series.between_years(None, Some(2016)).len(), 2);
        assert_eq!(series.between_years(Some(2030), None).len(), 0);
    }

    #[test]
    fn test_trailing_months() {
        let points: Vec<PricePoint> = (0..120)
            .map(|i| PricePoint::new(d(2015 + i / 12, (i % 12) as u32 + 1, 1), 1.0))
            .collect();
        let series = PriceSeries::new(points).unwrap();
        let last_year = series.trailing_months(12);
        assert_eq!(last_year.len(), 12);
        assert_eq!(last_year.first_date(), Some(d(2024, 1, 1)));
        assert_eq!(series.trailing_months(600).len(), 120);
        assert!(PriceSeries::new(vec![]).unwrap().trailing_months(12).is_empty());
    }

    #[test]
    fn test_returns_skip_invalid_samples() {
        let points = vec![
            PricePoint::new(d(2020, 1, 1), 100.0),
            PricePoint::new(d(2020, 2, 1), 0.0),
            PricePoint::new(d(2020, 3, 1), 110.0),
        ];
        let r = PriceSeries::new(points).unwrap().returns();
        assert_eq!(r.len(), 1);
        assert!((r.points[0].value - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_validates_order() {
        let json = r#"[{"date":"2020-02-01","price":1.0},{"date":"2020-01-01","price":2.0}]"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
    }
}
