//! Price provider trait definition.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{PriceMap, Symbol};

/// Trait for upstream price data sources.
///
/// Implement this trait to add a new source to the fallback chain. The chain
/// uses `priority()` to fix the rank order and calls `fetch_prices` with the
/// subset of symbols still unresolved by earlier providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use coinfolio_market_data::{PriceMap, PriceProvider, ProviderError, Symbol};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl PriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError> {
///         // ... query the upstream API
///         Ok(PriceMap::new())
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINGECKO", "COINMARKETCAP", etc.
    /// Used for logging and diagnostics.
    fn id(&self) -> &'static str;

    /// Rank in the fallback chain. Lower values are tried first.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch current USD prices for the given symbols.
    ///
    /// Returns a partial mapping: only symbols the provider resolved to a
    /// strictly-positive price appear, and a symbol whose upstream data is
    /// absent, malformed, or non-positive is omitted rather than reported as
    /// an error. An `Err` means the provider as a whole contributed nothing
    /// this call (not configured, transport failure, unusable body).
    ///
    /// Callers guarantee `symbols` is non-empty.
    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<PriceMap, ProviderError>;
}
