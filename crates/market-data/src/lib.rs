//! Coinfolio Market Data Crate
//!
//! This crate resolves USD spot prices for a set of asset symbols across
//! multiple upstream providers, tolerating any single provider being
//! unavailable, rate-limited, or returning malformed data.
//!
//! # Overview
//!
//! Providers are walked in fixed rank order; each successive provider is
//! asked only for the symbols earlier providers could not resolve, and the
//! first provider to price a symbol wins. Symbols that fall through every
//! provider come back as zero-quote placeholders rather than errors, so a
//! resolution pass always yields a complete mapping.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  ProviderChain   |  (rank-ordered fallback, residual-set tracking)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  PriceProvider   | --> |   CoinCatalog    |  (symbol -> id directory,
//! +------------------+     +------------------+   CoinGecko only)
//!          |
//!          v
//! +------------------+
//! |    PriceQuote    |  (usd, usd_7d_change)
//! +------------------+
//! ```
//!
//! # Default chain
//!
//! 1. CoinGecko — no credentials, batched by catalogue id
//! 2. CoinMarketCap — API key header, batched by symbol
//! 3. CryptoCompare — no credentials, batched by symbol
//! 4. CoinAPI — bearer token, one request per symbol
//!
//! # Example
//!
//! ```ignore
//! use coinfolio_market_data::{ChainCredentials, ProviderChain};
//!
//! let chain = ProviderChain::with_default_providers(ChainCredentials {
//!     coinmarketcap_api_key: std::env::var("CMC_API_KEY").ok(),
//!     coinapi_token: std::env::var("COINAPI_TOKEN").ok(),
//! });
//!
//! let prices = chain.resolve(["BTC", "ETH", "SOL"]).await;
//! ```

pub mod catalog;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{PriceMap, PriceQuote, Symbol};

// Re-export error types
pub use errors::{FailureClass, ProviderError};

// Re-export provider types
pub use provider::coinapi::CoinApiProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::coinmarketcap::CoinMarketCapProvider;
pub use provider::cryptocompare::CryptoCompareProvider;
pub use provider::PriceProvider;

// Re-export registry types
pub use registry::{
    AttemptOutcome, ChainCredentials, ProviderAttempt, ProviderChain, ResolutionDiagnostics,
};

// Re-export catalog
pub use catalog::CoinCatalog;
