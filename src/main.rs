use pi42bot::api::Pi42Client;
use pi42bot::config::BotConfig;
use pi42bot::execution::{ExecutionConfig, Executor};
use pi42bot::strategy::StrategyConfig;
use pi42bot::stream::{kline_topics, run_stream, Trader};

use anyhow::Result;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = BotConfig::from_env()?;
    tracing::info!("pi42bot starting");
    tracing::info!("  symbols: {:?}", config.symbols);
    tracing::info!("  kline interval: {}", config.kline_interval);
    tracing::info!(
        "  ma period: {}, scale: {}, thresholds: {}/{}",
        config.ma_period,
        config.scale_param,
        config.buy_threshold,
        config.sell_threshold
    );
    tracing::info!(
        "  stop loss: {}%, cooldown: {}s, sizing: {}x, leverage: {}x",
        config.stop_loss_pct,
        config.cooldown.num_seconds(),
        config.sizing_multiplier,
        config.leverage
    );

    let client = Pi42Client::new(
        config.api_key.clone(),
        config.api_secret.clone(),
        config.base_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )?;

    let executor = Executor::new(client, ExecutionConfig::from(&config));
    let mut trader = Trader::new(StrategyConfig::from(&config), executor);

    let topics = kline_topics(&config.symbols, &config.kline_interval);
    let ws_url = config.ws_url.clone();

    tokio::select! {
        _ = run_stream(&ws_url, &topics, &mut trader) => {
            tracing::error!("kline stream loop exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
        }
    }

    tracing::info!("pi42bot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pi42bot=info".into()),
        )
        .init();
}
