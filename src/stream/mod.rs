// Kline stream ingestion: event parsing and the trading event loop

use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::api::ExchangeApi;
use crate::execution::Executor;
use crate::models::KlineEvent;
use crate::strategy::{IndicatorEngine, SignalEngine, StrategyConfig};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("malformed kline event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("kline close price is not numeric: {0:?}")]
    BadClosePrice(String),
}

/// Parse a raw stream payload into a kline event plus its numeric close
pub fn parse_kline_event(raw: &str) -> Result<(KlineEvent, f64), StreamError> {
    let event: KlineEvent = serde_json::from_str(raw)?;
    let close = event
        .kline
        .close
        .parse::<f64>()
        .map_err(|_| StreamError::BadClosePrice(event.kline.close.clone()))?;
    Ok((event, close))
}

/// The single consumer of kline events
///
/// Owns the per-symbol state triple (window, position flag, cooldown) via the
/// indicator and signal engines; events are processed to completion one at a
/// time, so no locking is needed.
pub struct Trader<A: ExchangeApi> {
    indicators: IndicatorEngine,
    signals: SignalEngine,
    executor: Executor<A>,
}

impl<A: ExchangeApi> Trader<A> {
    pub fn new(strategy: StrategyConfig, executor: Executor<A>) -> Self {
        Self {
            indicators: IndicatorEngine::new(&strategy),
            signals: SignalEngine::new(strategy),
            executor,
        }
    }

    /// Handle one raw frame off the socket
    ///
    /// Frames that are not kline events (subscription acks and the like) are
    /// ignored quietly; kline events with an unusable close price are the
    /// adapter's problem and get filtered here with a warning.
    pub async fn on_raw_message(&mut self, raw: &str) {
        match parse_kline_event(raw) {
            Ok((event, close)) => self.on_kline_event(&event, close).await,
            Err(StreamError::BadClosePrice(price)) => {
                tracing::warn!("dropping kline event with bad close price {:?}", price);
            }
            Err(StreamError::Malformed(_)) => {
                tracing::debug!("ignoring non-kline frame: {}", raw);
            }
        }
    }

    pub async fn on_kline_event(&mut self, event: &KlineEvent, close: f64) {
        let symbol = &event.symbol;

        let snapshot = match self.indicators.on_close(symbol, close) {
            Some(snapshot) => snapshot,
            None => {
                tracing::debug!(
                    "gathering data for {}... ({}/{})",
                    symbol,
                    self.indicators.samples(symbol),
                    self.indicators.period()
                );
                return;
            }
        };

        tracing::debug!(
            "{} | price: {}, MA: {:.4}, deviation: {:.4}, score: {:.4}",
            symbol,
            close,
            snapshot.moving_average,
            snapshot.deviation,
            snapshot.signal_score
        );

        let signals = self.signals.evaluate(symbol, close, &snapshot, Utc::now());
        if !signals.is_empty() {
            self.executor.handle_signals(symbol, close, &signals).await;
        }
    }

    pub fn in_position(&self, symbol: &str) -> bool {
        self.signals.in_position(symbol)
    }
}

/// Subscription topics for the configured symbols, e.g. `ethusdt@kline_2h`
pub fn kline_topics(symbols: &[String], interval: &str) -> Vec<String> {
    symbols
        .iter()
        .map(|s| format!("{}@kline_{}", s.to_lowercase(), interval))
        .collect()
}

/// Connect to the kline stream and feed the trader until shutdown
///
/// Reconnects forever with exponential backoff; per-connection errors never
/// bubble out of the loop.
pub async fn run_stream<A: ExchangeApi>(ws_url: &str, topics: &[String], trader: &mut Trader<A>) {
    let mut backoff = 1;
    const MAX_BACKOFF: u64 = 60;

    loop {
        match connect_and_stream(ws_url, topics, trader).await {
            Ok(()) => {
                tracing::info!("kline stream closed, reconnecting");
                backoff = 1;
            }
            Err(e) => {
                tracing::error!("kline stream error: {:#}. Reconnecting in {}s", e, backoff);
            }
        }
        tokio::time::sleep(tokio::time::Duration::from_secs(backoff)).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

async fn connect_and_stream<A: ExchangeApi>(
    ws_url: &str,
    topics: &[String],
    trader: &mut Trader<A>,
) -> Result<()> {
    tracing::info!("connecting to kline stream at {}", ws_url);
    let (ws_stream, _) = connect_async(ws_url)
        .await
        .context("failed to connect to kline stream")?;
    tracing::info!("kline stream connected, subscribing to {:?}", topics);

    let (mut write, mut read) = ws_stream.split();

    let subscribe = serde_json::json!({
        "event": "subscribe",
        "params": topics,
    });
    write
        .send(Message::Text(subscribe.to_string()))
        .await
        .context("failed to send subscription")?;

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => trader.on_raw_message(&text).await,
            Ok(Message::Ping(payload)) => {
                let _ = write.send(Message::Pong(payload)).await;
            }
            Ok(Message::Close(frame)) => {
                tracing::info!("kline stream closed by server: {:?}", frame);
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(e).context("kline stream read failed"),
        }
    }

    Ok(())
}
