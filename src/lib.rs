pub mod config;
pub mod driver;
pub mod monitor;
pub mod units;
