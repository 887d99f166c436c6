pub mod config;
pub mod error;
pub mod props;
pub mod types;
