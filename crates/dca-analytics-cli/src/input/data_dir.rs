use std::path::{Path, PathBuf};

use dca_analytics_core::market_data::PriceResolver;
use dca_analytics_core::series::PriceSeries;
use dca_analytics_core::{DcaError, DcaResult};

use super::prices::{load_prices, ResampleArg};

const EXTENSIONS: [&str; 2] = ["csv", "json"];

/// Resolves instrument identifiers to `<root>/<ID>.csv` or `<root>/<ID>.json`.
pub struct DirectoryResolver {
    root: PathBuf,
    resample: Option<ResampleArg>,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>, resample: Option<ResampleArg>) -> Result<Self, String> {
        let root = root.into();
        if !root.is_dir() {
            return Err(format!("Data directory not found: {}", root.display()));
        }
        Ok(Self { root, resample })
    }

    fn locate(&self, instrument_id: &str) -> Option<PathBuf> {
        let upper = instrument_id.to_uppercase();
        [instrument_id, upper.as_str()]
            .iter()
            .flat_map(|name| EXTENSIONS.iter().map(move |ext| format!("{name}.{ext}")))
            .map(|file| self.root.join(file))
            .find(|p| p.is_file())
    }
}

fn check_identifier(instrument_id: &str) -> DcaResult<()> {
    let bad = instrument_id.is_empty()
        || instrument_id.contains("..")
        || instrument_id.contains(['/', '\\'])
        || Path::new(instrument_id).is_absolute();
    if bad {
        return Err(DcaError::invalid(
            "instrument_id",
            format!("'{instrument_id}' is not a valid instrument identifier"),
        ));
    }
    Ok(())
}

impl PriceResolver for DirectoryResolver {
    fn resolve(
        &self,
        instrument_id: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> DcaResult<PriceSeries> {
        check_identifier(instrument_id)?;
        let path = self.locate(instrument_id).ok_or_else(|| {
            DcaError::UpstreamDataUnavailable(format!(
                "no price file for '{instrument_id}' in {}",
                self.root.display()
            ))
        })?;

        let window = load_prices(&path, self.resample)?.between_years(start_year, end_year);
        if window.is_empty() {
            return Err(DcaError::UpstreamDataUnavailable(format!(
                "'{instrument_id}' has no prices in the requested years"
            )));
        }
        Ok(window)
    }
}
