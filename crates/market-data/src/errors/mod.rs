//! Error types and failure classification for provider calls.
//!
//! This module provides:
//! - [`ProviderError`]: The error enum for a single provider call
//! - [`FailureClass`]: Classification for determining how the chain reacts

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

/// Errors that can occur during a single provider call.
///
/// A provider error never crosses the resolution boundary; the chain
/// classifies it via [`failure_class`](Self::failure_class), records it, and
/// moves on to the next provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider requires a credential that is not configured.
    /// Expected at runtime; the provider is skipped, not failed.
    #[error("Missing credentials: {provider}")]
    MissingCredentials {
        /// The provider lacking configuration
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {provider}")]
    Http {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider response body could not be parsed.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        /// The provider whose response failed to parse
        provider: String,
        /// Description of the parse failure
        message: String,
    },
}

impl ProviderError {
    /// Returns the failure classification for this error.
    ///
    /// - [`FailureClass::QuietSkip`]: not configured, skip silently
    /// - [`FailureClass::Transport`]: the call itself failed
    /// - [`FailureClass::BadData`]: the call succeeded but the body was unusable
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::MissingCredentials { .. } => FailureClass::QuietSkip,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::Http { .. }
            | Self::Network(_) => FailureClass::Transport,

            Self::Parse { .. } => FailureClass::BadData,
        }
    }

    /// Map a transport-level reqwest error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network(error)
        }
    }
}
