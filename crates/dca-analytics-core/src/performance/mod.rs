pub mod metrics;
pub mod rolling;

pub use metrics::{analyze, RiskMetrics, PERIODS_PER_YEAR};
pub use rolling::{rolling_sharpe, RollingSharpePoint, ROLLING_WINDOW};
