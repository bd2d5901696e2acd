//! Fallback chain for orchestrating price providers.
//!
//! The chain walks providers in fixed rank order, asking each one only for
//! the symbols still unresolved by earlier providers. Earlier providers
//! always win; a later provider can never overwrite an earlier result. A
//! resolution pass never fails: symbols that fall through every provider
//! come back as zero-quote placeholders.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::diagnostics::ResolutionDiagnostics;
use crate::catalog::CoinCatalog;
use crate::errors::FailureClass;
use crate::models::{PriceMap, PriceQuote, Symbol};
use crate::provider::coinapi::CoinApiProvider;
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::coinmarketcap::CoinMarketCapProvider;
use crate::provider::cryptocompare::CryptoCompareProvider;
use crate::provider::PriceProvider;

/// Optional credentials consumed by the default provider chain.
///
/// An absent value silently disables the corresponding provider; the chain
/// keeps its slot and skips over it at fetch time.
#[derive(Clone, Default)]
pub struct ChainCredentials {
    /// API key for CoinMarketCap (`X-CMC_PRO_API_KEY` header).
    pub coinmarketcap_api_key: Option<String>,

    /// Bearer token for CoinAPI.
    pub coinapi_token: Option<String>,
}

/// Ordered fallback chain of price providers.
pub struct ProviderChain {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl ProviderChain {
    /// Create a chain from arbitrary providers.
    ///
    /// Providers are sorted by `priority()` (lower first); the given order
    /// only breaks ties, so a chain can be reconfigured by supplying
    /// providers with different priorities rather than editing the walk.
    pub fn new(mut providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        providers.sort_by_key(|provider| provider.priority());
        Self { providers }
    }

    /// The standard four-provider chain: CoinGecko, CoinMarketCap,
    /// CryptoCompare, CoinAPI, sharing one coin catalog.
    pub fn with_default_providers(credentials: ChainCredentials) -> Self {
        let catalog = Arc::new(CoinCatalog::new());

        Self::new(vec![
            Arc::new(CoinGeckoProvider::new(catalog)),
            Arc::new(CoinMarketCapProvider::new(credentials.coinmarketcap_api_key)),
            Arc::new(CryptoCompareProvider::new()),
            Arc::new(CoinApiProvider::new(credentials.coinapi_token)),
        ])
    }

    /// Providers in rank order.
    pub fn providers(&self) -> &[Arc<dyn PriceProvider>] {
        &self.providers
    }

    /// Resolve prices for the given symbols.
    ///
    /// Always returns exactly one entry per distinct normalized symbol;
    /// symbols no provider could price come back as zero-quote placeholders.
    /// Provider failures of any kind never surface as errors here.
    pub async fn resolve<I>(&self, symbols: I) -> PriceMap
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let (prices, _) = self.resolve_with_diagnostics(symbols).await;
        prices
    }

    /// Resolve prices, also returning the per-provider attempt trail.
    pub async fn resolve_with_diagnostics<I>(
        &self,
        symbols: I,
    ) -> (PriceMap, ResolutionDiagnostics)
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let mut seen = HashSet::new();
        let mut remaining: Vec<Symbol> = symbols
            .into_iter()
            .map(Into::into)
            .filter(|symbol| !symbol.is_empty() && seen.insert(symbol.clone()))
            .collect();

        let mut diagnostics = ResolutionDiagnostics::new();
        let mut prices = PriceMap::with_capacity(remaining.len());

        for provider in &self.providers {
            if remaining.is_empty() {
                break;
            }

            let requested: HashSet<Symbol> = remaining.iter().cloned().collect();

            match provider.fetch_prices(&remaining).await {
                Ok(partial) => {
                    let mut resolved = 0usize;
                    for (symbol, quote) in partial {
                        // Only accept symbols still outstanding. Anything
                        // else would either overwrite an earlier provider's
                        // result or invent a key the caller never asked for.
                        if !requested.contains(&symbol) {
                            debug!(
                                "Ignoring unrequested symbol '{}' from '{}'",
                                symbol,
                                provider.id()
                            );
                            continue;
                        }

                        // Providers promise strictly-positive prices; guard
                        // anyway so one misbehaving implementation cannot
                        // plant a bogus quote that blocks the fallback.
                        if quote.usd <= Decimal::ZERO {
                            warn!(
                                "Discarding non-positive quote for '{}' from '{}'",
                                symbol,
                                provider.id()
                            );
                            continue;
                        }

                        prices.insert(symbol, quote);
                        resolved += 1;
                    }

                    debug!(
                        "Provider '{}' resolved {} of {} symbols",
                        provider.id(),
                        resolved,
                        remaining.len()
                    );
                    diagnostics.record_resolved(provider.id(), resolved);
                    remaining.retain(|symbol| !prices.contains_key(symbol));
                }
                Err(e) => match e.failure_class() {
                    FailureClass::QuietSkip => {
                        debug!("Provider '{}' skipped: {}", provider.id(), e);
                        diagnostics.record_skip(provider.id(), e.to_string());
                    }
                    FailureClass::Transport | FailureClass::BadData => {
                        warn!(
                            "Provider '{}' failed, trying next provider: {}",
                            provider.id(),
                            e
                        );
                        diagnostics.record_failure(provider.id(), e.to_string());
                    }
                },
            }
        }

        if !remaining.is_empty() {
            warn!(
                "No provider could price {} symbol(s) ({}); returning zero-quote \
                 placeholders. Attempts: {}",
                remaining.len(),
                remaining
                    .iter()
                    .map(Symbol::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                diagnostics.summary()
            );

            for symbol in remaining {
                prices.insert(symbol.clone(), PriceQuote::unresolved());
                diagnostics.unresolved.push(symbol);
            }
        } else {
            debug!("Price resolution complete: {}", diagnostics.summary());
        }

        (prices, diagnostics)
    }
}
