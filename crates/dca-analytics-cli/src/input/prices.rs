use clap::ValueEnum;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use dca_analytics_core::series::{PricePoint, PriceSeries, Resolution};
use dca_analytics_core::{DcaError, DcaResult};

/// Calendar bucket for collapsing daily or weekly price files.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResampleArg {
    Monthly,
    Quarterly,
}

impl From<ResampleArg> for Resolution {
    fn from(arg: ResampleArg) -> Self {
        match arg {
            ResampleArg::Monthly => Resolution::Monthly,
            ResampleArg::Quarterly => Resolution::Quarterly,
        }
    }
}

/// Load a price file: a JSON array of `{date, price}` objects, or CSV with a
/// `date,price` header. Rows may come in any order.
pub fn load_prices(path: &Path, resample: Option<ResampleArg>) -> DcaResult<PriceSeries> {
    let file = File::open(path).map_err(|e| {
        DcaError::invalid("prices", format!("failed to open '{}': {e}", path.display()))
    })?;

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let points = if is_json {
        parse_json(file)
    } else {
        parse_csv(file)
    }
    .map_err(|e| match e {
        DcaError::InvalidInput { reason, .. } => {
            DcaError::invalid("prices", format!("{}: {reason}", path.display()))
        }
        other => other,
    })?;

    let series = PriceSeries::from_unsorted(points)?;
    tracing::debug!(file = %path.display(), samples = series.len(), "price file loaded");

    Ok(match resample {
        Some(r) => series.resample(r.into()),
        None => series,
    })
}

pub fn parse_csv<R: Read>(reader: R) -> DcaResult<Vec<PricePoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<PricePoint>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| DcaError::invalid("prices", format!("row {}: {e}", i + 1)))
        })
        .collect()
}

pub fn parse_json<R: Read>(reader: R) -> DcaResult<Vec<PricePoint>> {
    serde_json::from_reader(reader).map_err(|e| DcaError::invalid("prices", e.to_string()))
}
