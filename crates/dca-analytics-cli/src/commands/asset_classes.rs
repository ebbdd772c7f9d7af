use clap::Args;
use serde::Serialize;
use serde_json::Value;

use dca_analytics_core::assumptions::AssetClassTable;
use dca_analytics_core::types::Rate;

use super::simulate::load_table;

/// Arguments for listing asset-class assumptions
#[derive(Args)]
pub struct AssetClassesArgs {
    /// JSON or YAML file overriding rows of the built-in table
    #[arg(long)]
    pub asset_table: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssetClassRow {
    asset_class: String,
    management_fee: Rate,
    risk_free_rate: Rate,
    default_instrument: Option<String>,
}

fn rows(table: &AssetClassTable) -> Vec<AssetClassRow> {
    table
        .entries()
        .iter()
        .map(|(class, d)| AssetClassRow {
            asset_class: class.to_string(),
            management_fee: d.management_fee,
            risk_free_rate: d.risk_free_rate,
            default_instrument: d.default_instrument.clone(),
        })
        .collect()
}

pub fn run_asset_classes(args: AssetClassesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(args.asset_table.as_deref())?;
    Ok(serde_json::to_value(rows(&table))?)
}
