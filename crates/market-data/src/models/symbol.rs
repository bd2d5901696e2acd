use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Canonical asset ticker.
///
/// Normalized to a trimmed, uppercase string at construction, so `"btc"`,
/// `" BTC "` and `"BTC"` all compare equal and hash to the same bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim().to_uppercase().as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used as the match key in directory lookups.
    pub fn match_key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&String> for Symbol {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
