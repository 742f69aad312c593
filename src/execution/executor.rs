use crate::api::ExchangeApi;
use crate::config::BotConfig;
use crate::models::Signal;

#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Fraction of balance committed per entry, as a multiplier on
    /// balance / price
    pub sizing_multiplier: f64,
    pub leverage: u32,
    pub margin_asset: String,
}

impl From<&BotConfig> for ExecutionConfig {
    fn from(config: &BotConfig) -> Self {
        Self {
            sizing_multiplier: config.sizing_multiplier,
            leverage: config.leverage,
            margin_asset: config.margin_asset.clone(),
        }
    }
}

/// Turns emitted signals into exchange calls
///
/// Signals arrive already guarded and with their state transitions applied,
/// so every one of them maps to exactly one exchange action. REST failures
/// are logged with the full response context and swallowed: the event loop
/// must keep running, and the state machine is not rolled back, so a failed
/// order leaves engine state and exchange reality divergent until an operator
/// intervenes.
pub struct Executor<A: ExchangeApi> {
    api: A,
    config: ExecutionConfig,
}

impl<A: ExchangeApi> Executor<A> {
    pub fn new(api: A, config: ExecutionConfig) -> Self {
        Self { api, config }
    }

    /// Process the signals of one event, in emission order
    pub async fn handle_signals(&self, symbol: &str, price: f64, signals: &[Signal]) {
        for signal in signals {
            match signal {
                Signal::Open => self.open_position(symbol, price).await,
                Signal::Close => self.close_positions(symbol, "close signal").await,
                Signal::StopLoss => self.close_positions(symbol, "stop loss").await,
            }
        }
    }

    async fn open_position(&self, symbol: &str, price: f64) {
        let balance = match self.api.futures_wallet_details().await {
            Ok(details) => match details.available_balance() {
                Some(balance) => balance,
                None => {
                    tracing::error!(
                        "{}: wallet response had no usable balance, skipping order",
                        symbol
                    );
                    return;
                }
            },
            Err(e) => {
                tracing::error!("{}: failed to fetch wallet balance: {}", symbol, e);
                return;
            }
        };

        let quantity = (balance / price) * self.config.sizing_multiplier;
        tracing::info!(
            "{}: placing market buy, balance {:.2}, price {}, quantity {:.6}",
            symbol,
            balance,
            price,
            quantity
        );

        match self
            .api
            .place_market_buy(symbol, quantity, self.config.leverage, &self.config.margin_asset)
            .await
        {
            Ok(response) => tracing::info!("{}: order placed: {}", symbol, response),
            Err(e) => tracing::error!(
                "{}: order placement failed, position state may now diverge from the exchange: {}",
                symbol,
                e
            ),
        }
    }

    /// Account-wide close: the exchange endpoint closes every open position,
    /// not only the triggering symbol's
    async fn close_positions(&self, symbol: &str, reason: &str) {
        match self.api.close_all_positions().await {
            Ok(response) => {
                tracing::info!("{}: closed all positions ({}): {}", symbol, reason, response)
            }
            Err(e) => tracing::error!(
                "{}: close-all-positions failed ({}), manual intervention may be required: {}",
                symbol,
                reason,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::{Signal, WalletDetails};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Wallet,
        PlaceOrder { symbol: String, quantity: f64 },
        CloseAll,
    }

    #[derive(Clone)]
    struct MockApi {
        calls: Arc<Mutex<Vec<Call>>>,
        balance: Option<f64>,
        fail_orders: bool,
    }

    impl MockApi {
        fn with_balance(balance: f64) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                balance: Some(balance),
                fail_orders: false,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeApi for MockApi {
        async fn futures_wallet_details(&self) -> Result<WalletDetails, ApiError> {
            self.calls.lock().unwrap().push(Call::Wallet);
            let inr_balance = match self.balance {
                Some(b) => serde_json::json!(b),
                None => serde_json::Value::Null,
            };
            Ok(WalletDetails { inr_balance })
        }

        async fn place_market_buy(
            &self,
            symbol: &str,
            quantity: f64,
            _leverage: u32,
            _margin_asset: &str,
        ) -> Result<serde_json::Value, ApiError> {
            self.calls.lock().unwrap().push(Call::PlaceOrder {
                symbol: symbol.to_string(),
                quantity,
            });
            if self.fail_orders {
                return Err(ApiError::Exchange {
                    status: reqwest::StatusCode::BAD_REQUEST,
                    body: "rejected".to_string(),
                });
            }
            Ok(serde_json::json!({"orderId": "1"}))
        }

        async fn close_all_positions(&self) -> Result<serde_json::Value, ApiError> {
            self.calls.lock().unwrap().push(Call::CloseAll);
            Ok(serde_json::json!({"status": "ok"}))
        }
    }

    fn config() -> ExecutionConfig {
        ExecutionConfig {
            sizing_multiplier: 2.5,
            leverage: 5,
            margin_asset: "INR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_sizes_order_from_balance() {
        let api = MockApi::with_balance(1000.0);
        let executor = Executor::new(api.clone(), config());

        executor.handle_signals("ETHUSDT", 100.0, &[Signal::Open]).await;

        // balance 1000 / price 100 * 2.5 = 25.0 exactly
        assert_eq!(
            api.calls(),
            vec![
                Call::Wallet,
                Call::PlaceOrder {
                    symbol: "ETHUSDT".to_string(),
                    quantity: 25.0
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_close_and_stop_loss_both_close_all() {
        let api = MockApi::with_balance(1000.0);
        let executor = Executor::new(api.clone(), config());

        executor
            .handle_signals("ETHUSDT", 100.0, &[Signal::Close])
            .await;
        executor
            .handle_signals("ETHUSDT", 100.0, &[Signal::StopLoss])
            .await;

        assert_eq!(api.calls(), vec![Call::CloseAll, Call::CloseAll]);
    }

    #[tokio::test]
    async fn test_missing_balance_skips_order() {
        let api = MockApi {
            calls: Arc::new(Mutex::new(Vec::new())),
            balance: None,
            fail_orders: false,
        };
        let executor = Executor::new(api.clone(), config());

        executor.handle_signals("ETHUSDT", 100.0, &[Signal::Open]).await;

        assert_eq!(api.calls(), vec![Call::Wallet]);
    }

    #[tokio::test]
    async fn test_order_failure_does_not_propagate() {
        let api = MockApi {
            calls: Arc::new(Mutex::new(Vec::new())),
            balance: Some(1000.0),
            fail_orders: true,
        };
        let executor = Executor::new(api.clone(), config());

        // Must not panic or return an error; the loop keeps running
        executor.handle_signals("ETHUSDT", 100.0, &[Signal::Open]).await;
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_signals_processed_in_emission_order() {
        let api = MockApi::with_balance(1000.0);
        let executor = Executor::new(api.clone(), config());

        executor
            .handle_signals("ETHUSDT", 100.0, &[Signal::Open, Signal::StopLoss])
            .await;

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Wallet);
        assert!(matches!(calls[1], Call::PlaceOrder { .. }));
        assert_eq!(calls[2], Call::CloseAll);
    }
}
