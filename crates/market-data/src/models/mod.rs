//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `asset_type` - Instrument classification (AssetType)
//! - `bar` - Daily and intraday OHLCV bars
//! - `interval` - Intraday bar intervals

mod asset_type;
mod bar;
mod interval;

pub use asset_type::{is_crypto_pair, AssetType};
pub use bar::{DailyBar, IntradayBar};
pub use interval::IntradayInterval;
