use serde::{Deserialize, Serialize};

/// A kline (candlestick) event as delivered by the exchange stream
///
/// Only the fields the engine consumes are kept: the pair symbol and the
/// close price of the current candle.
#[derive(Debug, Clone, Deserialize)]
pub struct KlineEvent {
    /// Pair symbol, e.g. "ETHUSDT"
    #[serde(rename = "ps")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: KlineTick,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KlineTick {
    /// Close price as sent on the wire (string)
    #[serde(rename = "c")]
    pub close: String,
}

/// Derived indicator values for one symbol at one event
///
/// Only defined once the rolling window is full; during warm-up no snapshot
/// exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub moving_average: f64,
    pub deviation: f64,
    /// Normalized deviation-magnitude score in [0, 1)
    pub signal_score: f64,
}

/// Trading signal emitted by the signal engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Open,
    Close,
    StopLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

/// Order placement body
///
/// Field declaration order matters: the exchange verifies the HMAC signature
/// against the exact serialized bytes, so this struct's order is the wire
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Milliseconds since epoch, as a string
    pub timestamp: String,
    #[serde(rename = "placeType")]
    pub place_type: String,
    pub quantity: f64,
    pub side: OrderSide,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(rename = "marginAsset")]
    pub margin_asset: String,
    #[serde(rename = "reduceOnly")]
    pub reduce_only: bool,
    pub leverage: u32,
}

impl OrderRequest {
    pub fn market_buy(
        symbol: &str,
        quantity: f64,
        leverage: u32,
        margin_asset: &str,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            timestamp: timestamp_ms.to_string(),
            place_type: "ORDER_FORM".to_string(),
            quantity,
            side: OrderSide::Buy,
            symbol: symbol.to_string(),
            order_type: OrderType::Market,
            margin_asset: margin_asset.to_string(),
            reduce_only: false,
            leverage,
        }
    }
}

/// Futures wallet details response
///
/// The exchange is inconsistent about numeric encoding, so the balance is
/// accepted as either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletDetails {
    #[serde(rename = "inrBalance")]
    pub inr_balance: serde_json::Value,
}

impl WalletDetails {
    pub fn available_balance(&self) -> Option<f64> {
        match &self.inr_balance {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kline_event_deserializes_wire_format() {
        let raw = r#"{"ps":"ETHUSDT","k":{"c":"1842.55"}}"#;
        let event: KlineEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.symbol, "ETHUSDT");
        assert_eq!(event.kline.close, "1842.55");
    }

    #[test]
    fn test_order_request_field_order_is_signing_order() {
        let order = OrderRequest::market_buy("ETHUSDT", 25.0, 5, "INR", 1700000000000);
        let body = serde_json::to_string(&order).unwrap();
        assert_eq!(
            body,
            r#"{"timestamp":"1700000000000","placeType":"ORDER_FORM","quantity":25.0,"side":"BUY","symbol":"ETHUSDT","type":"MARKET","marginAsset":"INR","reduceOnly":false,"leverage":5}"#
        );
    }

    #[test]
    fn test_wallet_balance_accepts_string_or_number() {
        let as_string: WalletDetails =
            serde_json::from_str(r#"{"inrBalance":"1000.5"}"#).unwrap();
        assert_eq!(as_string.available_balance(), Some(1000.5));

        let as_number: WalletDetails = serde_json::from_str(r#"{"inrBalance":1000.5}"#).unwrap();
        assert_eq!(as_number.available_balance(), Some(1000.5));

        let missing: WalletDetails = serde_json::from_str(r#"{"inrBalance":null}"#).unwrap();
        assert_eq!(missing.available_balance(), None);
    }
}
