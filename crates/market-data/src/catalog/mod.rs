//! Symbol-to-catalogue-id translation for CoinGecko.
//!
//! CoinGecko keys its market endpoints by internal coin id ("bitcoin"), not
//! ticker symbol ("BTC"). The directory mapping one to the other is fetched
//! once per process from `/coins/list` and cached for the process lifetime;
//! it changes rarely enough to be treated as an external reference table.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::errors::ProviderError;
use crate::models::Symbol;

const LIST_URL: &str = "https://api.coingecko.com/api/v3/coins/list";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One row of the `/coins/list` response.
#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
}

/// Process-wide symbol directory, populated lazily on first use.
///
/// The directory is write-once: a successful fetch is never refreshed, and a
/// failed fetch caches an empty directory, after which every lookup misses
/// for the rest of the process lifetime. Callers treat a miss as "this
/// provider cannot help with that symbol".
pub struct CoinCatalog {
    client: Client,
    directory: OnceCell<HashMap<String, String>>,
}

impl CoinCatalog {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            directory: OnceCell::new(),
        }
    }

    /// Catalog with a pre-populated directory, bypassing the network fetch.
    #[cfg(test)]
    pub(crate) fn with_entries(entries: &[(&str, &str)]) -> Self {
        let directory = entries
            .iter()
            .map(|(symbol, id)| (symbol.to_lowercase(), id.to_string()))
            .collect();

        Self {
            client: Client::new(),
            directory: OnceCell::new_with(Some(directory)),
        }
    }

    /// Translate symbols to catalogue ids.
    ///
    /// Matching is exact and case-insensitive on the symbol. Symbols with no
    /// directory entry are dropped from the returned mapping.
    pub async fn resolve(&self, symbols: &[Symbol]) -> HashMap<Symbol, String> {
        let directory = self.directory().await;

        let mut resolved = HashMap::new();
        for symbol in symbols {
            match directory.get(&symbol.match_key()) {
                Some(id) => {
                    resolved.insert(symbol.clone(), id.clone());
                }
                None => debug!("No catalogue entry for '{}'", symbol),
            }
        }
        resolved
    }

    async fn directory(&self) -> &HashMap<String, String> {
        self.directory
            .get_or_init(|| async {
                match self.fetch_directory().await {
                    Ok(directory) => {
                        debug!("Loaded coin directory with {} symbols", directory.len());
                        directory
                    }
                    Err(e) => {
                        warn!(
                            "Failed to load coin directory, symbol translation \
                             disabled for the rest of this process: {}",
                            e
                        );
                        HashMap::new()
                    }
                }
            })
            .await
    }

    async fn fetch_directory(&self) -> Result<HashMap<String, String>, ProviderError> {
        let response = self
            .client
            .get(LIST_URL)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("COINGECKO", e))?;

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                provider: "COINGECKO".to_string(),
                status: response.status().as_u16(),
            });
        }

        let entries: Vec<CoinListEntry> =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: "COINGECKO".to_string(),
                message: e.to_string(),
            })?;

        Ok(build_directory(entries))
    }
}

impl Default for CoinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Index list entries by lowercase symbol. Many coins share a ticker; the
/// first listing wins, matching the upstream list order.
fn build_directory(entries: Vec<CoinListEntry>) -> HashMap<String, String> {
    let mut directory = HashMap::with_capacity(entries.len());
    for entry in entries {
        directory
            .entry(entry.symbol.to_lowercase())
            .or_insert(entry.id);
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_list_deserialization() {
        let json = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
        ]"#;

        let entries: Vec<CoinListEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "bitcoin");
        assert_eq!(entries[0].symbol, "btc");
    }

    #[test]
    fn test_build_directory_first_listing_wins() {
        let entries = vec![
            CoinListEntry {
                id: "bitcoin".to_string(),
                symbol: "btc".to_string(),
            },
            CoinListEntry {
                id: "batcat".to_string(),
                symbol: "BTC".to_string(),
            },
        ];

        let directory = build_directory(entries);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory["btc"], "bitcoin");
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() {
        let catalog = CoinCatalog::with_entries(&[("btc", "bitcoin"), ("eth", "ethereum")]);

        let symbols = vec![Symbol::new("BTC"), Symbol::new("eth")];
        let resolved = catalog.resolve(&symbols).await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&Symbol::new("BTC")], "bitcoin");
        assert_eq!(resolved[&Symbol::new("ETH")], "ethereum");
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_symbols() {
        let catalog = CoinCatalog::with_entries(&[("btc", "bitcoin")]);

        let symbols = vec![Symbol::new("BTC"), Symbol::new("ZZZ")];
        let resolved = catalog.resolve(&symbols).await;

        assert_eq!(resolved.len(), 1);
        assert!(!resolved.contains_key(&Symbol::new("ZZZ")));
    }

    #[tokio::test]
    async fn test_empty_directory_resolves_nothing() {
        let catalog = CoinCatalog::with_entries(&[]);

        let symbols = vec![Symbol::new("BTC")];
        assert!(catalog.resolve(&symbols).await.is_empty());
    }
}
