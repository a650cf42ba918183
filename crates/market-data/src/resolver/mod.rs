//! Symbol resolution.
//!
//! Maps the symbol a user configures (e.g. `^GSPC`) to the ticker the
//! provider is queried with (e.g. `SPY`). Resolution is a pure lookup over
//! [`PROXY_TABLE`]; symbols without a rule pass through unchanged.

mod proxy_table;

pub use proxy_table::{find_proxy, ProxyRule, PROXY_TABLE};

use crate::models::{is_crypto_pair, AssetType};

/// Indicates how a symbol was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionSource {
    /// Substituted through a proxy rule.
    Proxy(&'static ProxyRule),
    /// `BASE-USD` crypto pair, passed through.
    Crypto,
    /// No rule applies, passed through.
    Passthrough,
}

/// Resolution result for one configured symbol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedSymbol {
    /// Normalized user-facing symbol (trimmed, upper-case)
    pub symbol: String,
    /// Ticker to query the provider with
    pub ticker: String,
    /// Classification of the user-facing symbol
    pub asset_type: AssetType,
    pub source: ResolutionSource,
}

impl ResolvedSymbol {
    pub fn is_proxy(&self) -> bool {
        matches!(self.source, ResolutionSource::Proxy(_))
    }

    /// Whether the provider can serve the resolved ticker at all.
    pub fn is_supported(&self) -> bool {
        is_provider_supported(&self.ticker)
    }
}

/// Trim and upper-case a symbol for lookup.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Resolve a requested symbol to the provider ticker.
///
/// Never fails. A symbol that is neither in the proxy table nor a crypto
/// pair is returned as-is (after normalization).
pub fn resolve_symbol(symbol: &str) -> ResolvedSymbol {
    let normalized = normalize_symbol(symbol);
    let asset_type = AssetType::classify(&normalized);

    let (ticker, source) = if is_crypto_pair(&normalized) {
        (normalized.clone(), ResolutionSource::Crypto)
    } else if let Some(rule) = find_proxy(&normalized) {
        (rule.ticker.to_string(), ResolutionSource::Proxy(rule))
    } else {
        (normalized.clone(), ResolutionSource::Passthrough)
    };

    ResolvedSymbol {
        symbol: normalized,
        ticker,
        asset_type,
        source,
    }
}

/// Shorthand for [`resolve_symbol`] when only the ticker matters.
pub fn provider_ticker(symbol: &str) -> String {
    resolve_symbol(symbol).ticker
}

/// Indices (`^...`) and futures (`...=F`) without a proxy are not served
/// by the provider.
pub fn is_provider_supported(ticker: &str) -> bool {
    !ticker.is_empty() && !ticker.starts_with('^') && !ticker.contains("=F")
}
