pub mod data_dir;
pub mod file;
pub mod prices;
pub mod stdin;
