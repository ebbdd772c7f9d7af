//! Seam to whatever supplies historical prices.
//!
//! The engine never fetches data. Callers implement [`PriceResolver`] over
//! their provider and the engine only consumes the resolved series.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DcaError;
use crate::series::PriceSeries;
use crate::DcaResult;

pub trait PriceResolver {
    /// Prices for `instrument_id` within the inclusive calendar-year window.
    ///
    /// Implementations return [`DcaError::UpstreamDataUnavailable`] when the
    /// identifier is unknown or has no data in the window.
    fn resolve(
        &self,
        instrument_id: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> DcaResult<PriceSeries>;
}

/// A resolved series together with the identifier that actually served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrices {
    pub requested_id: String,
    pub instrument_id: String,
    pub substituted: bool,
    pub series: PriceSeries,
}

fn attempt(
    resolver: &dyn PriceResolver,
    id: &str,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> DcaResult<Option<PriceSeries>> {
    match resolver.resolve(id, start_year, end_year) {
        Ok(series) if series.is_empty() => Ok(None),
        Ok(series) => Ok(Some(series)),
        Err(DcaError::UpstreamDataUnavailable(reason)) => {
            tracing::debug!(instrument = id, %reason, "no data from resolver");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve `primary`, substituting `fallback` when the primary has no data.
///
/// Errors other than "no data" (a malformed source, say) are propagated
/// as-is rather than masked by the fallback.
pub fn resolve_with_fallback(
    resolver: &dyn PriceResolver,
    primary: &str,
    fallback: Option<&str>,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> DcaResult<ResolvedPrices> {
    if let Some(series) = attempt(resolver, primary, start_year, end_year)? {
        return Ok(ResolvedPrices {
            requested_id: primary.to_string(),
            instrument_id: primary.to_string(),
            substituted: false,
            series,
        });
    }

    if let Some(fb) = fallback.filter(|fb| *fb != primary) {
        if let Some(series) = attempt(resolver, fb, start_year, end_year)? {
            tracing::warn!(
                requested = primary,
                substitute = fb,
                "primary instrument unavailable, using fallback"
            );
            return Ok(ResolvedPrices {
                requested_id: primary.to_string(),
                instrument_id: fb.to_string(),
                substituted: true,
                series,
            });
        }
        return Err(DcaError::UpstreamDataUnavailable(format!(
            "no price data for '{primary}' or fallback '{fb}' in {}",
            describe_window(start_year, end_year)
        )));
    }

    Err(DcaError::UpstreamDataUnavailable(format!(
        "no price data for '{primary}' in {}",
        describe_window(start_year, end_year)
    )))
}

fn describe_window(start_year: Option<i32>, end_year: Option<i32>) -> String {
    match (start_year, end_year) {
        (Some(s), Some(e)) => format!("{s}-{e}"),
        (Some(s), None) => format!("{s} onwards"),
        (None, Some(e)) => format!("up to {e}"),
        (None, None) => "the full history".to_string(),
    }
}

/// Resolver over series already held in memory, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, instrument_id: &str, series: PriceSeries) -> Self {
        self.insert(instrument_id, series);
        self
    }

    pub fn insert(&mut self, instrument_id: &str, series: PriceSeries) {
        self.series.insert(instrument_id.to_uppercase(), series);
    }
}

impl PriceResolver for InMemoryResolver {
    fn resolve(
        &self,
        instrument_id: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> DcaResult<PriceSeries> {
        let series = self
            .series
            .get(&instrument_id.to_uppercase())
            .ok_or_else(|| {
                DcaError::UpstreamDataUnavailable(format!("unknown instrument '{instrument_id}'"))
            })?;
        let window = series.between_years(start_year, end_year);
        if window.is_empty() {
            return Err(DcaError::UpstreamDataUnavailable(format!(
                "'{instrument_id}' has no prices in {}",
                describe_window(start_year, end_year)
            )));
        }
        Ok(window)
    }
}
