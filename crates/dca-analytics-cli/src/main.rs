mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::asset_classes::AssetClassesArgs;
use commands::forecast::ForecastArgs;
use commands::simulate::{BenchmarkArgs, SimulateArgs};
use commands::strategies::StrategiesArgs;

/// Dollar-cost averaging analytics
#[derive(Parser)]
#[command(
    name = "dca",
    version,
    about = "Dollar-cost averaging analytics",
    long_about = "Simulate a periodic investment plan against historical prices, derive \
                  volatility, CAGR and Sharpe, compare against a fee-free benchmark, \
                  project the return trend and compare lump sum against DCA schedules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr (-v debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a DCA plan and compute its risk metrics
    Simulate(SimulateArgs),
    /// Compare a DCA plan against the same plan in a fee-free benchmark
    Benchmark(BenchmarkArgs),
    /// Fit a linear trend to historical returns and project it forward
    Forecast(ForecastArgs),
    /// Compare lump sum against DCA at every frequency
    Strategies(StrategiesArgs),
    /// Print the effective asset-class assumptions
    AssetClasses(AssetClassesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Log level used when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level(verbose).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Benchmark(args) => commands::simulate::run_benchmark(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::Strategies(args) => commands::strategies::run_strategies(args),
        Commands::AssetClasses(args) => commands::asset_classes::run_asset_classes(args),
        Commands::Version => {
            println!("dca {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
