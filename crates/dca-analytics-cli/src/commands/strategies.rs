use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use dca_analytics_core::assumptions::DEFAULT_BENCHMARK;
use dca_analytics_core::pipeline;

use super::simulate::{single_series, PriceArgs};

/// Arguments for the lump sum vs. DCA comparison
#[derive(Args)]
pub struct StrategiesArgs {
    #[command(flatten)]
    pub source: PriceArgs,

    /// Instrument to load from --data-dir
    #[arg(long, default_value = DEFAULT_BENCHMARK)]
    pub instrument: String,

    /// Total capital deployed by every strategy
    #[arg(long)]
    pub capital: Decimal,
}

pub fn run_strategies(args: StrategiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capital = args
        .capital
        .to_f64()
        .ok_or_else(|| format!("capital {} is out of range", args.capital))?;
    let prices = single_series(&args.source, &args.instrument)?;
    let output = pipeline::run_strategy_comparison(&prices, capital)?;
    Ok(serde_json::to_value(output)?)
}
