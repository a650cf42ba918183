//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data providers must implement.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::MarketDataError;
use crate::models::{DailyBar, IntradayBar, IntradayInterval};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
/// Callers pass an already resolved provider ticker (see
/// [`crate::resolver::resolve_symbol`]).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use dailybars_market_data::provider::MarketDataProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     // ... implement fetch methods
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "ALPHA_VANTAGE".
    /// Used for logging and error reporting.
    fn id(&self) -> &'static str;

    /// Fetch daily bars for `ticker` within `[since, until]`.
    ///
    /// Bars are returned sorted ascending by date. An empty vector means
    /// the provider has nothing inside the window, which is not an error.
    async fn fetch_daily(
        &self,
        ticker: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyBar>, MarketDataError>;

    /// Fetch intraday bars for `ticker` within `[since, until]`.
    ///
    /// Bars are returned sorted ascending by timestamp.
    async fn fetch_intraday(
        &self,
        ticker: &str,
        interval: IntradayInterval,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<IntradayBar>, MarketDataError>;
}
