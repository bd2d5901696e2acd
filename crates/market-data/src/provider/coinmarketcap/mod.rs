//! CoinMarketCap provider implementation.
//!
//! First backup in the default chain. Batched by symbol, authenticated with
//! the `X-CMC_PRO_API_KEY` header; without a configured key the provider
//! skips itself instead of failing.
//!
//! # API Endpoints
//!
//! - Quotes: `https://pro-api.coinmarketcap.com/v2/cryptocurrency/quotes/latest?symbol={symbols}&convert=USD&skip_invalid=true`
//!
//! The v2 response maps each symbol to an *array* of listings because ticker
//! symbols collide across coins; the first listing with a usable USD quote
//! wins.

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

const BASE_URL: &str = "https://pro-api.coinmarketcap.com/v2";
const PROVIDER_ID: &str = "COINMARKETCAP";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, Vec<Listing>>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    quote: HashMap<String, ListingQuote>,
}

#[derive(Debug, Deserialize)]
struct ListingQuote {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    percent_change_7d: Option<f64>,
}

/// CoinMarketCap market data provider.
pub struct CoinMarketCapProvider {
    client: Client,
    api_key: Option<String>,
}

impl CoinMarketCapProvider {
    /// Create a new CoinMarketCap provider.
    ///
    /// An absent or empty API key leaves the provider in place but inert:
    /// every fetch reports missing credentials and the chain moves on.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Fetch the response body with API-key header authentication.
    async fn fetch(&self, url: &str, api_key: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
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

        response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER_ID, e))
    }

    fn collect_prices(symbols: &[Symbol], body: &QuotesResponse) -> PriceMap {
        let mut prices = PriceMap::new();

        for symbol in symbols {
            let Some(listings) = body.data.get(symbol.as_str()) else {
                continue;
            };

            let usd = listings
                .iter()
                .filter_map(|listing| listing.quote.get("USD"))
                .find_map(|quote| {
                    let price = quote.price.and_then(|p| Decimal::try_from(p).ok())?;
                    if price <= Decimal::ZERO {
                        warn!(
                            "Discarding non-positive price {} for '{}' from {}",
                            price, symbol, PROVIDER_ID
                        );
                        return None;
                    }
                    let change = quote
                        .percent_change_7d
                        .and_then(|c| Decimal::try_from(c).ok())
                        .unwrap_or(Decimal::ZERO);
                    Some((price, change))
                });

            if let Some((price, change)) = usd {
                prices.insert(symbol.clone(), PriceQuote::new(price, change));
            }
        }

        prices
    }
}

#[async_trait]
impl PriceProvider for CoinMarketCapProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingCredentials {
                provider: PROVIDER_ID.to_string(),
            });
        };

        let joined = symbols
            .iter()
            .map(|symbol| encode(symbol.as_str()).into_owned())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!(
            "{}/cryptocurrency/quotes/latest?symbol={}&convert=USD&skip_invalid=true",
            BASE_URL, joined
        );

        let response_text = self.fetch(&url, api_key).await?;
        let body: QuotesResponse =
            serde_json::from_str(&response_text).map_err(|e| ProviderError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::collect_prices(symbols, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const QUOTES_JSON: &str = r#"{
        "status": {"error_code": 0, "error_message": null},
        "data": {
            "BTC": [
                {"id": 1, "name": "Bitcoin",
                 "quote": {"USD": {"price": 50000.0, "percent_change_7d": 3.2}}}
            ],
            "ETH": [
                {"id": 1027, "name": "Ethereum",
                 "quote": {"USD": {"price": 3000.0, "percent_change_7d": null}}}
            ]
        }
    }"#;

    #[test]
    fn test_provider_id_and_priority() {
        let provider = CoinMarketCapProvider::new(Some("test-key".to_string()));
        assert_eq!(provider.id(), "COINMARKETCAP");
        assert_eq!(provider.priority(), 2);
    }

    #[test]
    fn test_quotes_response_deserialization() {
        let body: QuotesResponse = serde_json::from_str(QUOTES_JSON).unwrap();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data["BTC"][0].quote["USD"].price, Some(50000.0));
        assert!(body.data["ETH"][0].quote["USD"].percent_change_7d.is_none());
    }

    #[test]
    fn test_collect_prices_reads_usd_quotes() {
        let body: QuotesResponse = serde_json::from_str(QUOTES_JSON).unwrap();
        let symbols = vec![Symbol::new("BTC"), Symbol::new("ETH"), Symbol::new("ZZZ")];

        let prices = CoinMarketCapProvider::collect_prices(&symbols, &body);

        assert_eq!(prices.len(), 2);
        assert_eq!(
            prices[&Symbol::new("BTC")],
            PriceQuote::new(dec!(50000), dec!(3.2))
        );
        // null change defaults to zero
        assert_eq!(prices[&Symbol::new("ETH")].usd_7d_change, Decimal::ZERO);
        assert!(!prices.contains_key(&Symbol::new("ZZZ")));
    }

    #[test]
    fn test_collect_prices_rejects_non_positive_price() {
        let json = r#"{
            "data": {
                "BTC": [{"quote": {"USD": {"price": 0.0, "percent_change_7d": 1.0}}}]
            }
        }"#;
        let body: QuotesResponse = serde_json::from_str(json).unwrap();

        let prices = CoinMarketCapProvider::collect_prices(&[Symbol::new("BTC")], &body);
        assert!(prices.is_empty());
    }

    #[test]
    fn test_collect_prices_skips_listing_without_usd_quote() {
        let json = r#"{
            "data": {
                "BTC": [
                    {"quote": {}},
                    {"quote": {"USD": {"price": 49500.0, "percent_change_7d": 2.0}}}
                ]
            }
        }"#;
        let body: QuotesResponse = serde_json::from_str(json).unwrap();

        let prices = CoinMarketCapProvider::collect_prices(&[Symbol::new("BTC")], &body);
        assert_eq!(prices[&Symbol::new("BTC")].usd, dec!(49500));
    }

    #[tokio::test]
    async fn test_fetch_prices_without_key_reports_missing_credentials() {
        let provider = CoinMarketCapProvider::new(None);

        let error = provider
            .fetch_prices(&[Symbol::new("BTC")])
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn test_empty_key_is_treated_as_absent() {
        let provider = CoinMarketCapProvider::new(Some("   ".to_string()));

        let error = provider
            .fetch_prices(&[Symbol::new("BTC")])
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::MissingCredentials { .. }));
    }
}
