// Exchange API module
pub mod pi42;

pub use pi42::{ApiError, ExchangeApi, Pi42Client};
