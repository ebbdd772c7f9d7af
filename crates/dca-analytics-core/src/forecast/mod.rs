pub mod trend;

pub use trend::{
    forecast, ConfidenceInterval, ForecastPoint, SigmaBands, TrendDirection, TrendModel,
    TrendPoint, DEFAULT_CONFIDENCE, DEFAULT_PERIODS_AHEAD, MAX_PERIODS_AHEAD,
    MIN_OBSERVATIONS,
};
