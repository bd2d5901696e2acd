//! CoinGecko provider implementation.
//!
//! Primary source in the default chain. Requires no credentials, but keys
//! its market endpoint by internal coin id, so symbols are translated
//! through the [`CoinCatalog`] directory first.
//!
//! # API Endpoints
//!
//! - Markets: `https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&ids={ids}&price_change_percentage=7d`
//!
//! Rows carry `current_price` and `price_change_percentage_7d_in_currency`;
//! both are nullable for thinly traded coins and parsed accordingly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use urlencoding::encode;

use crate::catalog::CoinCatalog;
use crate::errors::ProviderError;
use crate::models::{PriceMap, PriceQuote, Symbol};
use crate::provider::PriceProvider;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One row of the markets response.
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_7d_in_currency: Option<f64>,
}

/// CoinGecko market data provider.
pub struct CoinGeckoProvider {
    client: Client,
    catalog: Arc<CoinCatalog>,
}

impl CoinGeckoProvider {
    /// Create a new CoinGecko provider sharing the given catalog.
    pub fn new(catalog: Arc<CoinCatalog>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, catalog }
    }

    /// Convert market rows back to a symbol-keyed map, keeping only rows
    /// with a usable, strictly-positive price.
    fn collect_prices(rows: Vec<MarketRow>, symbols_by_id: &HashMap<String, Symbol>) -> PriceMap {
        let mut prices = PriceMap::new();

        for row in rows {
            let Some(symbol) = symbols_by_id.get(&row.id) else {
                continue;
            };

            let price = match row.current_price.and_then(|p| Decimal::try_from(p).ok()) {
                Some(p) if p > Decimal::ZERO => p,
                Some(p) => {
                    warn!(
                        "Discarding non-positive price {} for '{}' from {}",
                        p, symbol, PROVIDER_ID
                    );
                    continue;
                }
                None => {
                    debug!("No price for '{}' in markets response", symbol);
                    continue;
                }
            };

            let change = row
                .price_change_percentage_7d_in_currency
                .and_then(|c| Decimal::try_from(c).ok())
                .unwrap_or(Decimal::ZERO);

            prices.insert(symbol.clone(), PriceQuote::new(price, change));
        }

        prices
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError> {
        // Invert the symbol -> id mapping so response rows (keyed by id) can
        // be attributed back to the symbols the caller asked for.
        let symbols_by_id: HashMap<String, Symbol> = self
            .catalog
            .resolve(symbols)
            .await
            .into_iter()
            .map(|(symbol, id)| (id, symbol))
            .collect();

        if symbols_by_id.is_empty() {
            debug!("{}: no symbols matched the coin directory", PROVIDER_ID);
            return Ok(PriceMap::new());
        }

        let ids = symbols_by_id
            .keys()
            .map(|id| encode(id).into_owned())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!(
            "{}/coins/markets?vs_currency=usd&ids={}&price_change_percentage=7d&per_page=250",
            BASE_URL, ids
        );

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

        let rows: Vec<MarketRow> = response.json().await.map_err(|e| ProviderError::Parse {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::collect_prices(rows, &symbols_by_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn symbols_by_id(pairs: &[(&str, &str)]) -> HashMap<String, Symbol> {
        pairs
            .iter()
            .map(|(id, symbol)| (id.to_string(), Symbol::new(symbol)))
            .collect()
    }

    #[test]
    fn test_provider_id_and_priority() {
        let provider = CoinGeckoProvider::new(Arc::new(CoinCatalog::with_entries(&[])));
        assert_eq!(provider.id(), "COINGECKO");
        assert_eq!(provider.priority(), 1);
    }

    #[test]
    fn test_market_row_deserialization() {
        let json = r#"[
            {"id": "bitcoin", "symbol": "btc", "current_price": 50000.0,
             "price_change_percentage_7d_in_currency": 3.2},
            {"id": "ethereum", "symbol": "eth", "current_price": 3000.0,
             "price_change_percentage_7d_in_currency": null}
        ]"#;

        let rows: Vec<MarketRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].current_price, Some(50000.0));
        assert!(rows[1].price_change_percentage_7d_in_currency.is_none());
    }

    #[test]
    fn test_collect_prices_maps_ids_back_to_symbols() {
        let rows = vec![MarketRow {
            id: "bitcoin".to_string(),
            current_price: Some(50000.0),
            price_change_percentage_7d_in_currency: Some(3.2),
        }];

        let prices = CoinGeckoProvider::collect_prices(rows, &symbols_by_id(&[("bitcoin", "BTC")]));
        assert_eq!(prices[&Symbol::new("BTC")], PriceQuote::new(dec!(50000), dec!(3.2)));
    }

    #[test]
    fn test_collect_prices_defaults_missing_change_to_zero() {
        let rows = vec![MarketRow {
            id: "ethereum".to_string(),
            current_price: Some(3000.0),
            price_change_percentage_7d_in_currency: None,
        }];

        let prices =
            CoinGeckoProvider::collect_prices(rows, &symbols_by_id(&[("ethereum", "ETH")]));
        assert_eq!(prices[&Symbol::new("ETH")].usd_7d_change, Decimal::ZERO);
    }

    #[test]
    fn test_collect_prices_omits_missing_and_non_positive_prices() {
        let rows = vec![
            MarketRow {
                id: "bitcoin".to_string(),
                current_price: None,
                price_change_percentage_7d_in_currency: None,
            },
            MarketRow {
                id: "ethereum".to_string(),
                current_price: Some(0.0),
                price_change_percentage_7d_in_currency: None,
            },
            MarketRow {
                id: "solana".to_string(),
                current_price: Some(-1.0),
                price_change_percentage_7d_in_currency: None,
            },
        ];

        let ids = symbols_by_id(&[("bitcoin", "BTC"), ("ethereum", "ETH"), ("solana", "SOL")]);
        assert!(CoinGeckoProvider::collect_prices(rows, &ids).is_empty());
    }

    #[test]
    fn test_collect_prices_ignores_unrequested_ids() {
        let rows = vec![MarketRow {
            id: "dogecoin".to_string(),
            current_price: Some(0.1),
            price_change_percentage_7d_in_currency: None,
        }];

        let prices = CoinGeckoProvider::collect_prices(rows, &symbols_by_id(&[("bitcoin", "BTC")]));
        assert!(prices.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_prices_short_circuits_on_empty_directory() {
        let provider = CoinGeckoProvider::new(Arc::new(CoinCatalog::with_entries(&[])));

        let result = provider.fetch_prices(&[Symbol::new("BTC")]).await.unwrap();
        assert!(result.is_empty());
    }
}
