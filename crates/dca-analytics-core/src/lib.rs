pub mod accumulation;
pub mod assumptions;
pub mod error;
pub mod market_data;
pub mod performance;
pub mod pipeline;
pub mod request;
pub mod series;
pub mod types;

mod stats;

#[cfg(feature = "benchmark")]
pub mod benchmark;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "strategies")]
pub mod strategies;

pub use error::DcaError;
pub use types::*;

/// Standard result type for all engine operations
pub type DcaResult<T> = Result<T, DcaError>;
