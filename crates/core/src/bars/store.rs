//! Bar storage trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use dailybars_market_data::DailyBar;

use crate::errors::Result;
use crate::instruments::Instrument;

/// Storage interface for daily OHLCV rows.
#[async_trait]
pub trait BarRepositoryTrait: Send + Sync {
    /// Most recent stored bar date for an instrument, if any.
    async fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>>;

    /// Inserts or updates one row per bar, keyed by `(instrument.id, bar.date)`.
    ///
    /// Implementations chunk the write by their configured batch size.
    /// Re-running with the same bars leaves the row count unchanged and
    /// stores the latest values.
    ///
    /// # Returns
    ///
    /// The number of rows written
    async fn upsert_bars(&self, instrument: &Instrument, bars: &[DailyBar]) -> Result<usize>;
}
