//! Daily OHLCV rows: stored model, storage trait and intraday aggregation.

mod aggregate;
mod model;
mod store;

pub use aggregate::aggregate_intraday_to_daily;
pub use model::BarRecord;
pub use store::BarRepositoryTrait;
