use clap::Args;
use serde_json::Value;

use dca_analytics_core::assumptions::DEFAULT_BENCHMARK;
use dca_analytics_core::forecast::{DEFAULT_CONFIDENCE, DEFAULT_PERIODS_AHEAD};
use dca_analytics_core::pipeline;

use super::simulate::{single_series, PriceArgs};

/// Arguments for the return trend forecast
#[derive(Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: PriceArgs,

    /// Instrument to load from --data-dir
    #[arg(long, default_value = DEFAULT_BENCHMARK)]
    pub instrument: String,

    /// Number of periods to project
    #[arg(long, default_value_t = DEFAULT_PERIODS_AHEAD)]
    pub periods_ahead: usize,

    /// Two-sided confidence level for the interval (e.g. 0.95)
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = single_series(&args.source, &args.instrument)?;
    let output = pipeline::run_forecast(&prices, args.periods_ahead, args.confidence)?;
    Ok(serde_json::to_value(output)?)
}
