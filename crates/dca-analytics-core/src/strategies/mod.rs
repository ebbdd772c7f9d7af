pub mod comparison;

pub use comparison::{compare_strategies, Strategy, StrategyComparison, StrategyPoint, StrategyReturn};
