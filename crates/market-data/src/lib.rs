//! Dailybars Market Data Crate
//!
//! This crate fetches OHLCV bars from an external market data provider and
//! maps user-facing symbols to provider tickers.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   User symbol    |  (^GSPC, BTC-USD, AAPL)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Resolver      |  (static proxy table)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | Provider ticker  |  (SPY, BTC-USD, AAPL)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (Alpha Vantage)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    DailyBar      |  (OHLCV per date)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`DailyBar`] - One trading day of OHLCV data
//! - [`IntradayBar`] - One intraday candle
//! - [`AssetType`] - Classification of a user-facing symbol
//! - [`ResolvedSymbol`] - Outcome of symbol resolution
//! - [`MarketDataProvider`] - Provider abstraction

pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use errors::MarketDataError;

pub use models::{is_crypto_pair, AssetType, DailyBar, IntradayBar, IntradayInterval};

pub use resolver::{
    is_provider_supported, normalize_symbol, provider_ticker, resolve_symbol, ProxyRule,
    ResolutionSource, ResolvedSymbol, PROXY_TABLE,
};

pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::MarketDataProvider;
