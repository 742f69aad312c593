use anyhow::{Context, Result};
use chrono::Duration;

/// Runtime configuration, loaded from environment variables
///
/// Credentials are required; everything else has a default matching the
/// shipped ETHUSDT deviation strategy.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub ws_url: String,

    /// Symbols to subscribe to, e.g. ["ETHUSDT"]
    pub symbols: Vec<String>,
    /// Kline interval for the stream subscription, e.g. "2h"
    pub kline_interval: String,

    pub ma_period: usize,
    pub scale_param: f64,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    /// Percent below the moving average that forces an exit
    pub stop_loss_pct: f64,
    /// Minimum time between successive close actions per symbol
    pub cooldown: Duration,

    pub sizing_multiplier: f64,
    pub leverage: u32,
    pub margin_asset: String,

    pub http_timeout_secs: u64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PI42_API_KEY").context("PI42_API_KEY not set")?;
        let api_secret = std::env::var("PI42_API_SECRET").context("PI42_API_SECRET not set")?;

        let base_url = env_or("PI42_BASE_URL", "https://fapi.pi42.com");
        let ws_url = env_or("PI42_WS_URL", "wss://fawss.pi42.com");

        let symbols: Vec<String> = env_or("SYMBOLS", "ETHUSDT")
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if symbols.is_empty() {
            anyhow::bail!("SYMBOLS resolved to an empty list");
        }

        Ok(Self {
            api_key,
            api_secret,
            base_url,
            ws_url,
            symbols,
            kline_interval: env_or("KLINE_INTERVAL", "2h"),
            ma_period: parse_env("MA_PERIOD", 44)?,
            scale_param: parse_env("SCALE_PARAM", 44.0)?,
            buy_threshold: parse_env("BUY_THRESHOLD", 0.1)?,
            sell_threshold: parse_env("SELL_THRESHOLD", 0.9)?,
            stop_loss_pct: parse_env("STOP_LOSS_PCT", 50.0)?,
            cooldown: Duration::seconds(parse_env("COOLDOWN_SECS", 60)?),
            sizing_multiplier: parse_env("SIZING_MULTIPLIER", 2.5)?,
            leverage: parse_env("LEVERAGE", 5)?,
            margin_asset: env_or("MARGIN_ASSET", "INR"),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 10)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_when_unset() {
        std::env::remove_var("PI42BOT_TEST_UNSET");
        let value: usize = parse_env("PI42BOT_TEST_UNSET", 44).unwrap();
        assert_eq!(value, 44);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("PI42BOT_TEST_GARBAGE", "not-a-number");
        let result: Result<f64> = parse_env("PI42BOT_TEST_GARBAGE", 1.0);
        assert!(result.is_err());
        std::env::remove_var("PI42BOT_TEST_GARBAGE");
    }
}
