use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Spot price quote in USD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Current price in USD. Always strictly positive in provider results;
    /// zero only in the placeholder written when every provider failed.
    pub usd: Decimal,

    /// Trailing 7-day change in percent. Zero when the source carries no
    /// change data.
    #[serde(default)]
    pub usd_7d_change: Decimal,
}

impl PriceQuote {
    pub fn new(usd: Decimal, usd_7d_change: Decimal) -> Self {
        Self { usd, usd_7d_change }
    }

    /// Quote without change data.
    pub fn spot(usd: Decimal) -> Self {
        Self {
            usd,
            usd_7d_change: Decimal::ZERO,
        }
    }

    /// Placeholder written for a symbol no provider could price.
    pub fn unresolved() -> Self {
        Self {
            usd: Decimal::ZERO,
            usd_7d_change: Decimal::ZERO,
        }
    }
}

/// Partial or complete mapping from symbol to quote.
pub type PriceMap = HashMap<Symbol, PriceQuote>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = PriceQuote::new(dec!(50000), dec!(3.2));
        assert_eq!(quote.usd, dec!(50000));
        assert_eq!(quote.usd_7d_change, dec!(3.2));
    }

    #[test]
    fn test_quote_spot_has_zero_change() {
        let quote = PriceQuote::spot(dec!(0.01));
        assert_eq!(quote.usd, dec!(0.01));
        assert_eq!(quote.usd_7d_change, Decimal::ZERO);
    }

    #[test]
    fn test_unresolved_placeholder_is_all_zero() {
        let quote = PriceQuote::unresolved();
        assert_eq!(quote.usd, Decimal::ZERO);
        assert_eq!(quote.usd_7d_change, Decimal::ZERO);
    }

    #[test]
    fn test_quote_deserializes_with_default_change() {
        let quote: PriceQuote = serde_json::from_str(r#"{"usd": 3000.5}"#).unwrap();
        assert_eq!(quote.usd, dec!(3000.5));
        assert_eq!(quote.usd_7d_change, Decimal::ZERO);
    }
}
