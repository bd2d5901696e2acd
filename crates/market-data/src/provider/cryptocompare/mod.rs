//! CryptoCompare provider implementation.
//!
//! Second backup in the default chain. Batched by symbol against the free
//! min-api endpoint, which requires no credentials.
//!
//! # API Endpoints
//!
//! - Prices: `https://min-api.cryptocompare.com/data/pricemulti?fsyms={symbols}&tsyms=USD`
//!
//! The response maps symbol -> { "USD": price } and carries no
//! trailing-window change data, so the 7-day change is filled with zero.
//! Error responses come back as a JSON object of a different shape
//! (`{"Response": "Error", ...}`) and fail typed parsing, which is exactly
//! the signal the chain treats as "this provider contributed nothing".

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use urlencoding::encode;

use crate::errors::ProviderError;
use crate::models::{PriceMap, PriceQuote, Symbol};
use crate::provider::PriceProvider;

const BASE_URL: &str = "https://min-api.cryptocompare.com/data";
const PROVIDER_ID: &str = "CRYPTOCOMPARE";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// symbol -> quote currency -> price
#[derive(Debug, Deserialize)]
struct PriceMultiResponse(HashMap<String, HashMap<String, f64>>);

/// CryptoCompare market data provider.
pub struct CryptoCompareProvider {
    client: Client,
}

impl CryptoCompareProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    fn collect_prices(symbols: &[Symbol], body: &PriceMultiResponse) -> PriceMap {
        let mut prices = PriceMap::new();

        for symbol in symbols {
            let Some(rates) = body.0.get(symbol.as_str()) else {
                continue;
            };
            let Some(price) = rates
                .get("USD")
                .and_then(|p| Decimal::try_from(*p).ok())
            else {
                continue;
            };

            if price <= Decimal::ZERO {
                warn!(
                    "Discarding non-positive price {} for '{}' from {}",
                    price, symbol, PROVIDER_ID
                );
                continue;
            }

            prices.insert(symbol.clone(), PriceQuote::spot(price));
        }

        prices
    }
}

impl Default for CryptoCompareProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for CryptoCompareProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError> {
        let joined = symbols
            .iter()
            .map(|symbol| encode(symbol.as_str()).into_owned())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/pricemulti?fsyms={}&tsyms=USD", BASE_URL, joined);

        let response = self
            .client
            .get(&url)
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

        let body: PriceMultiResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::collect_prices(symbols, &body))
    }
}
