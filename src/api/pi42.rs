use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

use crate::models::{OrderRequest, WalletDetails};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from the exchange, with the response body verbatim
    #[error("exchange returned {status}: {body}")]
    Exchange { status: StatusCode, body: String },
    /// DNS/connect/timeout failures, and undecodable response bodies
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("json encoding/decoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The order-affecting surface of the exchange, as seen by the executor
///
/// `Pi42Client` is the real implementation; tests substitute their own.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn futures_wallet_details(&self) -> Result<WalletDetails, ApiError>;
    async fn place_market_buy(
        &self,
        symbol: &str,
        quantity: f64,
        leverage: u32,
        margin_asset: &str,
    ) -> Result<serde_json::Value, ApiError>;
    async fn close_all_positions(&self) -> Result<serde_json::Value, ApiError>;
}

/// Signed REST client for the Pi42 futures API
///
/// Every call carries a millisecond timestamp and an HMAC-SHA256 signature in
/// the `signature` header. The exchange validates signatures byte-for-byte,
/// and it signs two different canonical forms: body-bearing methods sign the
/// compact JSON body (which is then sent unmodified), while GETs sign the
/// urlencoded query string. Neither kind of call is retried here; that is the
/// caller's decision.
#[derive(Clone)]
pub struct Pi42Client {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl Pi42Client {
    pub fn new(
        api_key: String,
        api_secret: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// HMAC-SHA256 over the canonical payload, hex encoded
    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Exchange { status, body });
        }
        Ok(response.json().await?)
    }

    /// Send a method with a JSON body; the signed bytes are the sent bytes
    async fn send_signed_body(
        &self,
        method: reqwest::Method,
        path: &str,
        body: String,
    ) -> Result<serde_json::Value, ApiError> {
        let signature = self.sign(&body);
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .request(method, &url)
            .header("api-key", &self.api_key)
            .header("signature", signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

#[async_trait]
impl ExchangeApi for Pi42Client {
    /// GET /v1/wallet/futures-wallet/details, signature over the query string
    async fn futures_wallet_details(&self) -> Result<WalletDetails, ApiError> {
        let query = format!("timestamp={}", Self::timestamp_ms());
        let signature = self.sign(&query);
        let url = format!("{}/v1/wallet/futures-wallet/details?{}", self.base_url, query);

        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .header("signature", signature)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let value = Self::read_json(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST /v1/order/place-order
    async fn place_market_buy(
        &self,
        symbol: &str,
        quantity: f64,
        leverage: u32,
        margin_asset: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let order = OrderRequest::market_buy(
            symbol,
            quantity,
            leverage,
            margin_asset,
            Self::timestamp_ms(),
        );
        let body = serde_json::to_string(&order)?;
        self.send_signed_body(reqwest::Method::POST, "/v1/order/place-order", body)
            .await
    }

    /// DELETE /v1/positions/close-all-positions (account-wide, not per symbol)
    async fn close_all_positions(&self) -> Result<serde_json::Value, ApiError> {
        let body = format!(r#"{{"timestamp":"{}"}}"#, Self::timestamp_ms());
        self.send_signed_body(
            reqwest::Method::DELETE,
            "/v1/positions/close-all-positions",
            body,
        )
        .await
    }
}
