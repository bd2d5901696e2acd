//! Price provider abstraction and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that all providers implement
//! - Concrete provider implementations (CoinGecko, CoinMarketCap, etc.)
//!
//! Providers are deliberately dumb: each one answers a batch price request
//! for whatever subset of symbols it can, and the chain in the registry
//! module decides which provider is asked what, and in which order.

mod traits;

pub mod coinapi;
pub mod coingecko;
pub mod coinmarketcap;
pub mod cryptocompare;

pub use traits::PriceProvider;
