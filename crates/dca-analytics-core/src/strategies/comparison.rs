use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accumulation::Frequency;
use crate::error::DcaError;
use crate::series::{PricePoint, PriceSeries};
use crate::stats::mean;
use crate::DcaResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    LumpSum,
    DcaMonthly,
    DcaQuarterly,
    DcaSemiannual,
    DcaAnnual,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::LumpSum,
        Strategy::DcaMonthly,
        Strategy::DcaQuarterly,
        Strategy::DcaSemiannual,
        Strategy::DcaAnnual,
    ];

    pub fn dca(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Monthly => Strategy::DcaMonthly,
            Frequency::Quarterly => Strategy::DcaQuarterly,
            Frequency::Semiannual => Strategy::DcaSemiannual,
            Frequency::Annual => Strategy::DcaAnnual,
        }
    }

    /// Contribution stride in samples; `None` for the lump sum.
    pub fn stride(&self) -> Option<usize> {
        match self {
            Strategy::LumpSum => None,
            Strategy::DcaMonthly => Some(Frequency::Monthly.stride()),
            Strategy::DcaQuarterly => Some(Frequency::Quarterly.stride()),
            Strategy::DcaSemiannual => Some(Frequency::Semiannual.stride()),
            Strategy::DcaAnnual => Some(Frequency::Annual.stride()),
        }
    }
}

/// Value of every strategy at one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyPoint {
    pub date: NaiveDate,
    pub lump_sum: f64,
    pub dca_monthly: f64,
    pub dca_quarterly: f64,
    pub dca_semiannual: f64,
    pub dca_annual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyReturn {
    pub strategy: Strategy,
    pub contribution_events: usize,
    pub final_value: f64,
    /// `(final / capital - 1) * 100`
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub total_capital: f64,
    pub series: Vec<StrategyPoint>,
    pub returns: Vec<StrategyReturn>,
    pub best_strategy: Strategy,
    pub average_return_pct: f64,
}

impl StrategyComparison {
    pub fn return_of(&self, strategy: Strategy) -> Option<&StrategyReturn> {
        self.returns.iter().find(|r| r.strategy == strategy)
    }
}

/// Value path of `capital` invested in full at the first price.
fn lump_sum_path(prices: &[PricePoint], capital: f64) -> Vec<f64> {
    let p0 = prices[0].price;
    prices.iter().map(|p| capital * p.price / p0).collect()
}

/// Value path of `capital` split evenly over every `stride`-th sample.
/// Returns the path and the number of contribution events.
fn dca_path(prices: &[PricePoint], capital: f64, stride: usize) -> (Vec<f64>, usize) {
    let events = prices.len().div_ceil(stride);
    let per_event = capital / events as f64;
    let mut units = 0.0;
    let path = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i % stride == 0 {
                units += per_event / p.price;
            }
            units * p.price
        })
        .collect();
    (path, events)
}

/// Compare deploying `total_capital` at once against spreading it evenly
/// over monthly, quarterly, semiannual and annual contributions.
///
/// Non-positive samples are dropped before any strategy is evaluated, so
/// every path shares the same valid dates.
pub fn compare_strategies(prices: &PriceSeries, total_capital: f64) -> DcaResult<StrategyComparison> {
    if !total_capital.is_finite() || total_capital <= 0.0 {
        return Err(DcaError::invalid("total_capital", "must be a positive amount"));
    }

    let valid: Vec<PricePoint> = prices.points().iter().filter(|p| p.is_valid()).copied().collect();
    if valid.len() < 2 {
        return Err(DcaError::InsufficientHistory(format!(
            "at least 2 positive price samples required, got {}",
            valid.len()
        )));
    }

    let mut paths: Vec<(Strategy, Vec<f64>, usize)> = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        match strategy.stride() {
            None => paths.push((strategy, lump_sum_path(&valid, total_capital), 1)),
            Some(stride) => {
                let (path, events) = dca_path(&valid, total_capital, stride);
                paths.push((strategy, path, events));
            }
        }
    }

    let series = valid
        .iter()
        .enumerate()
        .map(|(i, p)| StrategyPoint {
            date: p.date,
            lump_sum: paths[0].1[i],
            dca_monthly: paths[1].1[i],
            dca_quarterly: paths[2].1[i],
            dca_semiannual: paths[3].1[i],
            dca_annual: paths[4].1[i],
        })
        .collect();

    let returns: Vec<StrategyReturn> = paths
        .iter()
        .map(|(strategy, path, events)| {
            let final_value = path.last().copied().unwrap_or(0.0);
            StrategyReturn {
                strategy: *strategy,
                contribution_events: *events,
                final_value,
                return_pct: (final_value / total_capital - 1.0) * 100.0,
            }
        })
        .collect();

    let best_strategy = returns
        .iter()
        .max_by(|a, b| a.return_pct.total_cmp(&b.return_pct))
        .map(|r| r.strategy)
        .unwrap_or(Strategy::LumpSum);
    let average_return_pct = mean(&returns.iter().map(|r| r.return_pct).collect::<Vec<_>>());

    tracing::debug!(
        samples = valid.len(),
        ?best_strategy,
        average_return_pct,
        "strategy comparison complete"
    );

    Ok(StrategyComparison {
        total_capital,
        series,
        returns,
        best_strategy,
        average_return_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                PricePoint::new(
                    NaiveDate::from_ymd_opt(2015 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap(),
                    p,
                )
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_lump_sum_path() {
        let cmp = compare_strategies(&monthly(&[100.0, 150.0, 200.0]), 1000.0).unwrap();
        let lump: Vec<f64> = cmp.series.iter().map(|p| p.lump_sum).collect();
        assert_eq!(lump, vec![1000.0, 1500.0, 2000.0]);
        let r = cmp.return_of(Strategy::LumpSum).unwrap();
        assert!((r.return_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_dca_event_counts() {
        let prices = monthly(&[100.0; 13]);
        let cmp = compare_strategies(&prices, 1300.0).unwrap();
        let events: Vec<usize> = Strategy::ALL
            .iter()
            .map(|s| cmp.return_of(*s).unwrap().contribution_events)
            .collect();
        // ceil(13 / f) for f in 1, 3, 6, 12
        assert_eq!(events, vec![1, 13, 5, 3, 2]);
    }

    #[test]
    fn test_dca_deploys_all_capital() {
        let prices = monthly(&[100.0; 24]);
        let cmp = compare_strategies(&prices, 2400.0).unwrap();
        for r in &cmp.returns {
            assert!((r.final_value - 2400.0).abs() < 1e-9, "{:?}", r);
            assert!(r.return_pct.abs() < 1e-9);
        }
    }

    #[test]
    fn test_dca_units_carried_between_events() {
        // Quarterly on 4 samples: events at 0 and 3, 500 each
        let prices = monthly(&[100.0, 200.0, 50.0, 100.0]);
        let cmp = compare_strategies(&prices, 1000.0).unwrap();
        let q: Vec<f64> = cmp.series.iter().map(|p| p.dca_quarterly).collect();
        assert!((q[0] - 500.0).abs() < 1e-9);
        assert!((q[1] - 1000.0).abs() < 1e-9);
        assert!((q[2] - 250.0).abs() < 1e-9);
        assert!((q[3] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rising_market_favours_lump_sum() {
        let prices: Vec<f64> = (0..24).map(|i| 100.0 + 5.0 * i as f64).collect();
        let cmp = compare_strategies(&monthly(&prices), 10_000.0).unwrap();
        assert_eq!(cmp.best_strategy, Strategy::LumpSum);
    }

    #[test]
    fn test_falling_market_favours_dca() {
        let prices: Vec<f64> = (0..24).map(|i| 200.0 - 5.0 * i as f64).collect();
        let cmp = compare_strategies(&monthly(&prices), 10_000.0).unwrap();
        assert_ne!(cmp.best_strategy, Strategy::LumpSum);
    }

    #[test]
    fn test_invalid_samples_dropped() {
        let cmp = compare_strategies(&monthly(&[100.0, 0.0, 120.0]), 1000.0).unwrap();
        assert_eq!(cmp.series.len(), 2);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(compare_strategies(&monthly(&[100.0, 110.0]), 0.0).is_err());
        assert!(matches!(
            compare_strategies(&monthly(&[100.0]), 1000.0),
            Err(DcaError::InsufficientHistory(_))
        ));
    }
}
