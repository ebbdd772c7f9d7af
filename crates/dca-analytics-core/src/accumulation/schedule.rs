use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DcaError;
use crate::DcaResult;

/// How often the periodic amount is invested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "semi_annual", alias = "semiannually")]
    Semiannual,
    #[serde(alias = "annually", alias = "yearly")]
    Annual,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Semiannual,
        Frequency::Annual,
    ];

    /// Contribution stride measured in monthly price samples.
    pub fn stride(&self) -> usize {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Semiannual => 6,
            Frequency::Annual => 12,
        }
    }

    pub fn contributions_per_year(&self) -> u32 {
        12 / self.stride() as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannual => "semiannual",
            Frequency::Annual => "annual",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "semiannual" | "semi_annual" | "semi-annual" | "semiannually" => {
                Ok(Frequency::Semiannual)
            }
            "annual" | "annually" | "yearly" => Ok(Frequency::Annual),
            other => Err(DcaError::invalid(
                "frequency",
                format!("unknown frequency '{other}'. Use: monthly, quarterly, semiannual, annual"),
            )),
        }
    }
}

/// Amounts and cadence of a DCA plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub initial_amount: f64,
    pub periodic_amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
}

impl ContributionSchedule {
    pub fn new(initial_amount: f64, periodic_amount: f64, frequency: Frequency) -> Self {
        Self {
            initial_amount,
            periodic_amount,
            frequency,
        }
    }

    /// A one-off investment with no periodic top-ups.
    pub fn lump_sum(amount: f64) -> Self {
        Self::new(amount, 0.0, Frequency::Monthly)
    }

    pub fn validate(&self) -> DcaResult<()> {
        if !self.initial_amount.is_finite() || self.initial_amount <= 0.0 {
            return Err(DcaError::invalid(
                "initial_amount",
                "must be a positive amount",
            ));
        }
        if !self.periodic_amount.is_finite() || self.periodic_amount < 0.0 {
            return Err(DcaError::invalid(
                "periodic_amount",
                "must be zero or a positive amount",
            ));
        }
        Ok(())
    }
}

/// Annual management fee, charged pro-rata on every monthly sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub annual_fee_rate: f64,
}

impl FeeSchedule {
    pub fn new(annual_fee_rate: f64) -> Self {
        Self { annual_fee_rate }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Fraction of value kept after one period's fee.
    pub fn retention_factor(&self) -> f64 {
        1.0 - self.annual_fee_rate / 12.0
    }

    pub fn validate(&self) -> DcaResult<()> {
        if !self.annual_fee_rate.is_finite() || !(0.0..=1.0).contains(&self.annual_fee_rate) {
            return Err(DcaError::invalid(
                "annual_fee_rate",
                "must be a decimal rate between 0 and 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides() {
        let strides: Vec<usize> = Frequency::ALL.iter().map(|f| f.stride()).collect();
        assert_eq!(strides, vec![1, 3, 6, 12]);
        assert_eq!(Frequency::Quarterly.contributions_per_year(), 4);
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("semi-annual".parse::<Frequency>().unwrap(), Frequency::Semiannual);
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_deserialize_alias() {
        let f: Frequency = serde_json::from_str("\"annually\"").unwrap();
        assert_eq!(f, Frequency::Annual);
    }

    #[test]
    fn test_schedule_defaults_to_monthly() {
        let s: ContributionSchedule =
            serde_json::from_str(r#"{"initial_amount":1000,"periodic_amount":50}"#).unwrap();
        assert_eq!(s.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_schedule_rejects_zero_initial() {
        assert!(ContributionSchedule::new(0.0, 100.0, Frequency::Monthly)
            .validate()
            .is_err());
    }

    #[test]
    fn test_schedule_rejects_negative_periodic() {
        assert!(ContributionSchedule::new(1000.0, -1.0, Frequency::Monthly)
            .validate()
            .is_err());
    }

    #[test]
    fn test_fee_retention() {
        let fee = FeeSchedule::new(0.012);
        assert!((fee.retention_factor() - 0.999).abs() < 1e-12);
        assert!(FeeSchedule::new(-0.01).validate().is_err());
        assert!(FeeSchedule::new(1.5).validate().is_err());
    }
}
