pub mod aggregator;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logger;
pub mod messages;
pub mod proximity;
pub mod types;
pub mod utils;
