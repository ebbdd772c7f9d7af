pub mod asset_classes;
pub mod forecast;
pub mod simulate;
pub mod strategies;
