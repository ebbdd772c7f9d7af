use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accumulation::{ContributionSchedule, FeeSchedule, Frequency};
use crate::assumptions::{AssetClass, AssetClassTable, DEFAULT_BENCHMARK};
use crate::error::DcaError;
use crate::types::Money;
use crate::DcaResult;

/// A DCA plan as submitted by a caller.
///
/// Amounts accept either JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub initial_amount: Money,
    #[serde(default)]
    pub periodic_amount: Money,
    #[serde(default)]
    pub frequency: Frequency,
    /// Plan length in years; derived from `end_year - start_year` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<Decimal>,
    #[serde(default)]
    pub asset_class: AssetClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
}

/// Everything the engine needs once a request has been validated and the
/// asset-class table consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAssumptions {
    pub schedule: ContributionSchedule,
    pub fees: FeeSchedule,
    pub risk_free_rate: f64,
    pub duration_years: f64,
    pub asset_class: AssetClass,
    pub instrument_id: String,
    pub benchmark_id: String,
}

fn to_f64(field: &str, value: Decimal) -> DcaResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| DcaError::invalid(field, format!("{value} is not representable")))
}

impl SimulationRequest {
    pub fn new(initial_amount: Money, periodic_amount: Money, frequency: Frequency) -> Self {
        Self {
            initial_amount,
            periodic_amount,
            frequency,
            duration_years: None,
            asset_class: AssetClass::default(),
            instrument_id: None,
            benchmark_id: None,
            start_year: None,
            end_year: None,
        }
    }

    /// Plan duration in years after validating the date fields.
    pub fn duration(&self) -> DcaResult<Decimal> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if end <= start {
                return Err(DcaError::invalid(
                    "end_year",
                    format!("end year {end} must be after start year {start}"),
                ));
            }
        }

        let duration = match (self.duration_years, self.start_year, self.end_year) {
            (Some(d), _, _) => d,
            (None, Some(start), Some(end)) => Decimal::from(end - start),
            _ => {
                return Err(DcaError::invalid(
                    "duration_years",
                    "required unless both start_year and end_year are given",
                ))
            }
        };

        if duration <= Decimal::ZERO {
            return Err(DcaError::invalid("duration_years", "must be positive"));
        }
        Ok(duration)
    }

    pub fn validate(&self) -> DcaResult<()> {
        if self.initial_amount <= Decimal::ZERO {
            return Err(DcaError::invalid(
                "initial_amount",
                "must be a positive amount",
            ));
        }
        if self.periodic_amount < Decimal::ZERO {
            return Err(DcaError::invalid(
                "periodic_amount",
                "must be zero or a positive amount",
            ));
        }
        if matches!(&self.instrument_id, Some(id) if id.trim().is_empty()) {
            return Err(DcaError::invalid("instrument_id", "must not be blank"));
        }
        self.duration()?;
        Ok(())
    }

    /// Validate and combine with the asset-class defaults.
    pub fn resolve(&self, table: &AssetClassTable) -> DcaResult<PlanAssumptions> {
        self.validate()?;
        let defaults = table.get(self.asset_class)?;

        let benchmark_id = self
            .benchmark_id
            .clone()
            .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());
        let instrument_id = self
            .instrument_id
            .clone()
            .or_else(|| defaults.default_instrument.clone())
            .unwrap_or_else(|| benchmark_id.clone());

        let schedule = ContributionSchedule::new(
            to_f64("initial_amount", self.initial_amount)?,
            to_f64("periodic_amount", self.periodic_amount)?,
            self.frequency,
        );
        let fees = FeeSchedule::new(to_f64("management_fee", defaults.management_fee)?);
        schedule.validate()?;
        fees.validate()?;

        Ok(PlanAssumptions {
            schedule,
            fees,
            risk_free_rate: to_f64("risk_free_rate", defaults.risk_free_rate)?,
            duration_years: to_f64("duration_years", self.duration()?)?,
            asset_class: self.asset_class,
            instrument_id,
            benchmark_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> SimulationRequest {
        let mut r = SimulationRequest::new(dec!(1000), dec!(100), Frequency::Monthly);
        r.duration_years = Some(dec!(5));
        r
    }

    #[test]
    fn test_resolve_uses_table() {
        let mut r = request();
        r.asset_class = AssetClass::Bonds;
        let a = r.resolve(&AssetClassTable::default()).unwrap();
        assert!((a.fees.annual_fee_rate - 0.002).abs() < 1e-12);
        assert!((a.risk_free_rate - 0.02).abs() < 1e-12);
        assert_eq!(a.instrument_id, "AGG");
        assert_eq!(a.benchmark_id, "ACWI");
        assert_eq!(a.duration_years, 5.0);
    }

    #[test]
    fn test_instrument_override_wins() {
        let mut r = request();
        r.instrument_id = Some("SPY".into());
        let a = r.resolve(&AssetClassTable::default()).unwrap();
        assert_eq!(a.instrument_id, "SPY");
    }

    #[test]
    fn test_duration_from_years() {
        let mut r = request();
        r.duration_years = None;
        r.start_year = Some(2015);
        r.end_year = Some(2025);
        assert_eq!(r.duration().unwrap(), dec!(10));
    }

    #[test]
    fn test_rejects_reversed_years() {
        let mut r = request();
        r.start_year = Some(2025);
        r.end_year = Some(2020);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_duration() {
        let mut r = request();
        r.duration_years = None;
        assert!(matches!(r.validate(), Err(DcaError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_non_positive_initial() {
        let mut r = request();
        r.initial_amount = dec!(0);
        assert!(r.validate().is_err());
        r.initial_amount = dec!(-5);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_duration() {
        let mut r = request();
        r.duration_years = Some(dec!(0));
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_deserialize_string_amounts() {
        let json = r#"{
            "initial_amount": "1000",
            "periodic_amount": "50.5",
            "frequency": "quarterly",
            "asset_class": "etf",
            "start_year": 2015,
            "end_year": 2020
        }"#;
        let r: SimulationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.initial_amount, dec!(1000));
        assert_eq!(r.periodic_amount, dec!(50.5));
        assert_eq!(r.frequency, Frequency::Quarterly);
        assert_eq!(r.asset_class, AssetClass::Etf);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_unparseable_amount_is_rejected() {
        let json = r#"{"initial_amount": "lots", "duration_years": 3}"#;
        assert!(serde_json::from_str::<SimulationRequest>(json).is_err());
    }

    #[test]
    fn test_deserialize_numeric_amounts() {
        let json = r#"{"initial_amount": 1000, "periodic_amount": 50.5, "duration_years": 3}"#;
        let r: SimulationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.initial_amount, dec!(1000));
        assert_eq!(r.periodic_amount, dec!(50.5));
        assert_eq!(r.duration_years, Some(dec!(3)));
        assert!(r.validate().is_ok());
    }
}
