use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instrument classification, stored in the `type` column of `instruments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Equity,
    Crypto,
    Index,
    Future,
}

impl AssetType {
    /// Classify a user-facing symbol.
    ///
    /// `BTC-USD` style pairs are crypto, `^` prefixed symbols are indices and
    /// `=F` suffixed symbols are futures. Everything else is treated as an equity.
    pub fn classify(symbol: &str) -> Self {
        let upper = symbol.trim().to_uppercase();
        if is_crypto_pair(&upper) {
            Self::Crypto
        } else if upper.starts_with('^') {
            Self::Index
        } else if upper.contains("=F") {
            Self::Future
        } else {
            Self::Equity
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Crypto => "crypto",
            Self::Index => "index",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equity" => Ok(Self::Equity),
            "crypto" => Ok(Self::Crypto),
            "index" => Ok(Self::Index),
            "future" => Ok(Self::Future),
            other => Err(format!("Unknown asset type: {}", other)),
        }
    }
}

/// True for `BASE-USD` crypto pairs such as `BTC-USD`.
pub fn is_crypto_pair(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    upper.len() > "-USD".len() && upper.ends_with("-USD")
}
