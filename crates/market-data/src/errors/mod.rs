//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// None of these are retried inside a run. The next scheduled run
/// re-covers the overlap window.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429 or an API note).
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

    /// A provider-specific error occurred (HTTP failure, API error message).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response did not contain a time series, or the series was empty.
    #[error("Empty response from {provider} for {symbol}")]
    EmptyResponse {
        provider: String,
        symbol: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        provider: String,
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether the failure is likely to go away on a later run without
    /// any configuration change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_transient() {
        let error = MarketDataError::RateLimited {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = MarketDataError::Timeout {
            provider: "ALPHA_VANTAGE".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_symbol_not_found_is_not_transient() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_malformed_payload_is_not_transient() {
        let error = MarketDataError::MalformedPayload {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::ProviderError {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(error.to_string(), "Provider error: ALPHA_VANTAGE - HTTP 500");

        let error = MarketDataError::EmptyResponse {
            provider: "ALPHA_VANTAGE".to_string(),
            symbol: "SPY".to_string(),
        };
        assert_eq!(error.to_string(), "Empty response from ALPHA_VANTAGE for SPY");
    }
}
