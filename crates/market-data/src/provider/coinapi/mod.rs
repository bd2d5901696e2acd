//! CoinAPI provider implementation.
//!
//! Last resort in the default chain. Authenticated with a bearer token and
//! limited to one exchange-rate lookup per symbol, so it is only ever asked
//! for the residual set the batched providers could not resolve. The
//! per-symbol requests are issued concurrently; a failed lookup drops that
//! symbol and never poisons its siblings.
//!
//! # API Endpoints
//!
//! - Rate: `https://rest.coinapi.io/v1/exchangerate/{symbol}/USD`

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use urlencoding::encode;

use crate::errors::ProviderError;
use crate::models::{PriceMap, PriceQuote, Symbol};
use crate::provider::PriceProvider;

const BASE_URL: &str = "https://rest.coinapi.io/v1";
const PROVIDER_ID: &str = "COINAPI";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(default)]
    rate: Option<f64>,
}

/// CoinAPI market data provider.
pub struct CoinApiProvider {
    client: Client,
    token: Option<String>,
}

impl CoinApiProvider {
    /// Create a new CoinAPI provider.
    ///
    /// An absent or empty bearer token leaves the provider inert: every
    /// fetch reports missing credentials and the chain moves on.
    pub fn new(token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Fetch the USD exchange rate for a single symbol.
    async fn fetch_rate(&self, token: &str, symbol: &Symbol) -> Result<Decimal, ProviderError> {
        let url = format!(
            "{}/exchangerate/{}/USD",
            BASE_URL,
            encode(symbol.as_str())
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER_ID, e))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                provider: PROVIDER_ID.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ExchangeRateResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        body.rate
            .and_then(|r| Decimal::try_from(r).ok())
            .ok_or_else(|| ProviderError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: "no rate in response".to_string(),
            })
    }
}

#[async_trait]
impl PriceProvider for CoinApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        4
    }

    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError> {
        let Some(token) = self.token.as_deref() else {
            return Err(ProviderError::MissingCredentials {
                provider: PROVIDER_ID.to_string(),
            });
        };

        let lookups = symbols
            .iter()
            .map(|symbol| async move { (symbol, self.fetch_rate(token, symbol).await) });

        let mut prices = PriceMap::new();
        for (symbol, result) in join_all(lookups).await {
            match result {
                Ok(rate) if rate > Decimal::ZERO => {
                    prices.insert(symbol.clone(), PriceQuote::spot(rate));
                }
                Ok(rate) => {
                    warn!(
                        "Discarding non-positive rate {} for '{}' from {}",
                        rate, symbol, PROVIDER_ID
                    );
                }
                Err(e) => {
                    debug!("Rate lookup failed for '{}': {}", symbol, e);
                }
            }
        }

        Ok(prices)
    }
}
