//! CoinGecko market data client
//!
//! Fetches the `/coins/markets` listing the fetcher binary stages as raw
//! ingestion documents. Retries with a fixed backoff on rate limiting and
//! transport errors; the load engine never sees this layer.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Maximum fetch attempts before giving up
const MAX_RETRIES: u32 = 3;

/// Delay between attempts
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoService {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Fetch current market records for the given comma-separated coin
    /// ids, as raw JSON objects in the provider's shape.
    pub async fn fetch_markets(
        &self,
        ids: &str,
    ) -> Result<Vec<Value>, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = ids.split(',').count().max(1).to_string();

        for attempt in 1..=MAX_RETRIES {
            let mut request = self
                .client
                .get(&url)
                .header("accept", "application/json")
                .timeout(Duration::from_secs(10))
                .query(&[
                    ("vs_currency", "usd"),
                    ("ids", ids),
                    ("order", "market_cap_desc"),
                    ("per_page", per_page.as_str()),
                    ("page", "1"),
                ]);
            if let Some(key) = &self.api_key {
                request = request.header("x-cg-pro-api-key", key);
            }

            match request.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    tracing::warn!(attempt, "CoinGecko rate limit hit, backing off");
                }
                Ok(response) if response.status().is_success() => {
                    let records = response.json::<Vec<Value>>().await?;
                    tracing::info!(count = records.len(), "Fetched market records");
                    return Ok(records);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(format!("CoinGecko API error {}: {}", status, body).into());
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "CoinGecko request failed");
                }
            }

            if attempt < MAX_RETRIES {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }

        Err("CoinGecko fetch failed after multiple retries".into())
    }
}
