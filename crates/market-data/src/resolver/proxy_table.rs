//! Static proxy substitutions for symbols the provider cannot serve directly.

/// A single substitution: query `ticker` whenever `symbol` is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyRule {
    /// Symbol as the user configures it (upper-case)
    pub symbol: &'static str,
    /// Ticker sent to the provider
    pub ticker: &'static str,
    pub description: &'static str,
}

/// Indices and futures mapped to the ETFs that track them.
pub static PROXY_TABLE: &[ProxyRule] = &[
    ProxyRule {
        symbol: "^GSPC",
        ticker: "SPY",
        description: "S&P 500 via SPY ETF",
    },
    ProxyRule {
        symbol: "^IXIC",
        ticker: "QQQ",
        description: "NASDAQ Composite via QQQ ETF",
    },
    ProxyRule {
        symbol: "^TNX",
        ticker: "IEF",
        description: "10Y Treasury yield via 7-10Y Treasury ETF",
    },
    ProxyRule {
        symbol: "GC=F",
        ticker: "GLD",
        description: "Gold futures via GLD ETF",
    },
];

/// Find the proxy rule for an already normalized symbol.
pub fn find_proxy(symbol: &str) -> Option<&'static ProxyRule> {
    PROXY_TABLE.iter().find(|rule| rule.symbol == symbol)
}
