// Core modules
pub mod api;
pub mod config;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod strategy;
pub mod stream;

// Re-export commonly used types
pub use api::{ApiError, ExchangeApi, Pi42Client};
pub use config::BotConfig;
pub use models::*;
pub use stream::Trader;
