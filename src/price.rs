//! Live crypto prices from the CoinGecko simple-price API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PriceConfig;
use crate::error::PriceError;

/// Host reported as the source of price facts.
pub const PRICE_SOURCE_HOST: &str = "coingecko.com";

/// A USD quote for one coin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinQuote {
    /// Coin id as the price API knows it (`bitcoin`, `ethereum`, ...).
    pub coin: String,
    /// Spot price in USD.
    pub price_usd: f64,
    /// 24-hour change in percent, when reported.
    pub change_24h: Option<f64>,
}

impl CoinQuote {
    /// Facts form: `bitcoin $97,123.45 (+1.23% 24h) (coingecko)`.
    pub fn facts_line(&self) -> String {
        format!(
            "{} ${} ({:+.2}% 24h) (coingecko)",
            self.coin,
            format_usd(self.price_usd),
            self.change_24h.unwrap_or(0.0)
        )
    }

    /// Prompt form, placed first in the `/ask` context.
    pub fn live_data_line(&self) -> String {
        format!(
            "LIVE DATA: {} price is ${} USD (24h change: {:.2}%)\n\n",
            self.coin,
            format_usd(self.price_usd),
            self.change_24h.unwrap_or(0.0)
        )
    }
}

/// Something that can quote a coin price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Quote `coin` in USD. `Ok(None)` means the coin is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the lookup itself fails.
    async fn quote(&self, coin: &str) -> Result<Option<CoinQuote>, PriceError>;
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

/// [`PriceSource`] backed by CoinGecko's `simple/price` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    api_url: String,
}

impl CoinGeckoClient {
    /// Create a client from the price configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &PriceConfig) -> Result<Self, PriceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PriceError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn quote(&self, coin: &str) -> Result<Option<CoinQuote>, PriceError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("ids", coin),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await
            .map_err(|e| PriceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Http(status.as_u16()));
        }

        let mut prices: HashMap<String, SimplePrice> = response
            .json()
            .await
            .map_err(|e| PriceError::Decode(e.to_string()))?;

        let quote = prices.remove(coin).and_then(|p| {
            p.usd.map(|price_usd| CoinQuote {
                coin: coin.to_owned(),
                price_usd,
                change_24h: p.usd_24h_change,
            })
        });
        tracing::debug!(coin, found = quote.is_some(), "price lookup");
        Ok(quote)
    }
}

/// Format a USD amount with thousands separators and two decimals.
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}
