use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use dca_analytics_core::accumulation::Frequency;
use dca_analytics_core::assumptions::{AssetClass, AssetClassTable};
use dca_analytics_core::market_data::{resolve_with_fallback, PriceResolver};
use dca_analytics_core::pipeline;
use dca_analytics_core::request::SimulationRequest;
use dca_analytics_core::series::PriceSeries;

use crate::input;
use crate::input::data_dir::DirectoryResolver;
use crate::input::prices::{load_prices, ResampleArg};

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// Plan definition: a request file, piped JSON, or individual flags.
/// Flags given alongside a request file override its fields.
#[derive(Args)]
pub struct PlanArgs {
    /// Path to a JSON or YAML request file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested at the first valid price
    #[arg(long)]
    pub initial_amount: Option<Decimal>,

    /// Amount invested at every contribution date
    #[arg(long)]
    pub periodic_amount: Option<Decimal>,

    /// Contribution frequency: monthly, quarterly, semiannual, annual
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// Plan horizon in years (derived from the year window when omitted)
    #[arg(long)]
    pub duration_years: Option<Decimal>,

    /// Asset class: equities, bonds, etf, unspecified
    #[arg(long)]
    pub asset_class: Option<AssetClass>,

    /// Instrument to simulate (defaults to the asset class's instrument)
    #[arg(long)]
    pub instrument: Option<String>,

    /// Benchmark instrument (defaults to ACWI)
    #[arg(long)]
    pub benchmark_id: Option<String>,

    /// First calendar year of the analysis window
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last calendar year of the analysis window
    #[arg(long)]
    pub end_year: Option<i32>,

    /// JSON or YAML file overriding rows of the asset-class table
    #[arg(long)]
    pub asset_table: Option<String>,
}

/// Where prices come from: an explicit file or a directory of per-instrument files.
#[derive(Args)]
pub struct PriceArgs {
    /// CSV (date,price) or JSON price file
    #[arg(long, conflicts_with = "data_dir")]
    pub prices: Option<String>,

    /// Directory of <ID>.csv / <ID>.json price files
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Collapse the price data to one sample per period
    #[arg(long)]
    pub resample: Option<ResampleArg>,
}

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[command(flatten)]
    pub source: PriceArgs,
}

#[derive(Args)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[command(flatten)]
    pub source: PriceArgs,

    /// CSV or JSON price file for the benchmark (otherwise resolved from --data-dir)
    #[arg(long)]
    pub benchmark_prices: Option<String>,
}

// ---------------------------------------------------------------------------
// Request assembly
// ---------------------------------------------------------------------------

pub fn load_table(path: Option<&str>) -> Result<AssetClassTable, Box<dyn std::error::Error>> {
    let table = AssetClassTable::default();
    Ok(match path {
        Some(p) => table.merged_with(input::file::read_structured(p)?),
        None => table,
    })
}

fn build_request(plan: &PlanArgs) -> Result<SimulationRequest, Box<dyn std::error::Error>> {
    let mut request: SimulationRequest = if let Some(ref path) = plan.input {
        input::file::read_structured(path)?
    } else if let Some(amount) = plan.initial_amount {
        SimulationRequest::new(amount, Decimal::ZERO, Frequency::default())
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <request.json|yaml>, --initial-amount or stdin required".into());
    };
    apply_overrides(&mut request, plan);
    Ok(request)
}

fn apply_overrides(request: &mut SimulationRequest, plan: &PlanArgs) {
    if let Some(v) = plan.initial_amount {
        request.initial_amount = v;
    }
    if let Some(v) = plan.periodic_amount {
        request.periodic_amount = v;
    }
    if let Some(v) = plan.frequency {
        request.frequency = v;
    }
    if let Some(v) = plan.duration_years {
        request.duration_years = Some(v);
    }
    if let Some(v) = plan.asset_class {
        request.asset_class = v;
    }
    if let Some(ref v) = plan.instrument {
        request.instrument_id = Some(v.clone());
    }
    if let Some(ref v) = plan.benchmark_id {
        request.benchmark_id = Some(v.clone());
    }
    if let Some(v) = plan.start_year {
        request.start_year = Some(v);
    }
    if let Some(v) = plan.end_year {
        request.end_year = Some(v);
    }
}

/// Prices for the plan's instrument plus a warning if a fallback served them.
fn plan_prices(
    source: &PriceArgs,
    request: &SimulationRequest,
    table: &AssetClassTable,
) -> Result<(PriceSeries, Option<String>), Box<dyn std::error::Error>> {
    if let Some(ref path) = source.prices {
        let file = input::file::resolve_path(path)?;
        return Ok((load_prices(&file, source.resample)?, None));
    }
    let Some(ref dir) = source.data_dir else {
        return Err("--prices <file> or --data-dir <dir> required".into());
    };

    let assumptions = request.resolve(table)?;
    let resolver = DirectoryResolver::new(dir, source.resample)?;
    let resolved = resolve_with_fallback(
        &resolver,
        &assumptions.instrument_id,
        Some(&assumptions.benchmark_id),
        request.start_year,
        request.end_year,
    )?;
    let warning = resolved.substituted.then(|| {
        format!(
            "no price data for '{}', substituted '{}'",
            resolved.requested_id, resolved.instrument_id
        )
    });
    Ok((resolved.series, warning))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(args.plan.asset_table.as_deref())?;
    let request = build_request(&args.plan)?;
    let (prices, substitution) = plan_prices(&args.source, &request, &table)?;

    let mut output = pipeline::run_simulation(&request, &prices, &table)?;
    output.warnings.extend(substitution);
    Ok(serde_json::to_value(output)?)
}

pub fn run_benchmark(args: BenchmarkArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(args.plan.asset_table.as_deref())?;
    let request = build_request(&args.plan)?;
    let (prices, substitution) = plan_prices(&args.source, &request, &table)?;

    let benchmark_prices = if let Some(ref path) = args.benchmark_prices {
        let file = input::file::resolve_path(path)?;
        load_prices(&file, args.source.resample)?
    } else if let Some(ref dir) = args.source.data_dir {
        let assumptions = request.resolve(&table)?;
        DirectoryResolver::new(dir, args.source.resample)?.resolve(
            &assumptions.benchmark_id,
            request.start_year,
            request.end_year,
        )?
    } else {
        return Err("--benchmark-prices <file> or --data-dir <dir> required".into());
    };

    let mut output = pipeline::run_benchmark(&request, &prices, &benchmark_prices, &table)?;
    output.warnings.extend(substitution);
    Ok(serde_json::to_value(output)?)
}

/// Load prices for commands that take a single series without a plan.
pub fn single_series(
    source: &PriceArgs,
    instrument: &str,
) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    if let Some(ref path) = source.prices {
        let file = input::file::resolve_path(path)?;
        return Ok(load_prices(&file, source.resample)?);
    }
    let Some(ref dir) = source.data_dir else {
        return Err("--prices <file> or --data-dir <dir> required".into());
    };
    let resolver = DirectoryResolver::new(dir, source.resample)?;
    Ok(resolver.resolve(instrument, None, None)?)
}
