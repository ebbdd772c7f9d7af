use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DcaError;
use crate::types::Rate;
use crate::DcaResult;

/// Instrument the plan is benchmarked against unless a request says otherwise.
pub const DEFAULT_BENCHMARK: &str = "ACWI";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[serde(alias = "equity", alias = "stocks")]
    Equities,
    #[serde(alias = "bond")]
    Bonds,
    #[serde(alias = "etfs")]
    Etf,
    #[default]
    Unspecified,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equities => "equities",
            AssetClass::Bonds => "bonds",
            AssetClass::Etf => "etf",
            AssetClass::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equities" | "equity" | "stocks" => Ok(AssetClass::Equities),
            "bonds" | "bond" => Ok(AssetClass::Bonds),
            "etf" | "etfs" => Ok(AssetClass::Etf),
            "unspecified" | "" => Ok(AssetClass::Unspecified),
            other => Err(DcaError::invalid(
                "asset_class",
                format!("unknown asset class '{other}'. Use: equities, bonds, etf, unspecified"),
            )),
        }
    }
}

/// Fee and risk-free assumptions applied to every plan of an asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClassDefaults {
    /// Annual management fee (0.006 = 0.6%)
    pub management_fee: Rate,
    /// Annual risk-free rate used in Sharpe ratios
    pub risk_free_rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_instrument: Option<String>,
}

impl AssetClassDefaults {
    pub fn new(management_fee: Decimal, risk_free_rate: Decimal, instrument: &str) -> Self {
        Self {
            management_fee,
            risk_free_rate,
            default_instrument: Some(instrument.to_string()),
        }
    }
}

/// Lookup table from asset class to default assumptions.
///
/// Deserializes from a plain map so a table can be loaded from JSON or YAML
/// and injected in place of the built-in one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetClassTable {
    entries: BTreeMap<AssetClass, AssetClassDefaults>,
}

impl Default for AssetClassTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            AssetClass::Equities,
            AssetClassDefaults::new(dec!(0.006), dec!(0.015), "ACWI"),
        );
        entries.insert(
            AssetClass::Bonds,
            AssetClassDefaults::new(dec!(0.002), dec!(0.020), "AGG"),
        );
        entries.insert(
            AssetClass::Etf,
            AssetClassDefaults::new(dec!(0.004), dec!(0.017), "VT"),
        );
        entries.insert(
            AssetClass::Unspecified,
            AssetClassDefaults::new(dec!(0.005), dec!(0.017), DEFAULT_BENCHMARK),
        );
        Self { entries }
    }
}

impl AssetClassTable {
    pub fn new(entries: BTreeMap<AssetClass, AssetClassDefaults>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<AssetClass, AssetClassDefaults> {
        &self.entries
    }

    pub fn insert(&mut self, class: AssetClass, defaults: AssetClassDefaults) {
        self.entries.insert(class, defaults);
    }

    /// Overlay `overrides` on top of this table.
    pub fn merged_with(mut self, overrides: AssetClassTable) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Defaults for `class`, falling back to the unspecified row.
    pub fn get(&self, class: AssetClass) -> DcaResult<&AssetClassDefaults> {
        self.entries
            .get(&class)
            .or_else(|| self.entries.get(&AssetClass::Unspecified))
            .ok_or_else(|| {
                DcaError::invalid(
                    "asset_class",
                    format!("no defaults configured for '{class}' and no unspecified fallback"),
                )
            })
    }
}
