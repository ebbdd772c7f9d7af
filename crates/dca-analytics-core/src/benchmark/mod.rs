pub mod comparison;

pub use comparison::{compare, AlignedPoint, BenchmarkComparison, Verdict, VERDICT_THRESHOLD_PCT};
