pub mod schedule;
pub mod simulator;

pub use schedule::{ContributionSchedule, FeeSchedule, Frequency};
pub use simulator::{simulate, AccumulationResult, ValuePath, ValuePoint};
