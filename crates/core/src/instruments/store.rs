//! Instrument storage trait.

use async_trait::async_trait;

use super::model::{Instrument, NewInstrument};
use crate::errors::Result;

/// Storage interface for instrument metadata.
///
/// Instruments are created on first encounter and never updated or deleted.
#[async_trait]
pub trait InstrumentRepositoryTrait: Send + Sync {
    /// Looks up an instrument by its user-facing symbol.
    ///
    /// Read-only: never creates a row.
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>>;

    /// Returns the instrument for `new_instrument.symbol`, creating it if
    /// it does not exist yet.
    ///
    /// Idempotent: repeated calls with the same symbol return the same id
    /// and never create a duplicate row.
    async fn get_or_create(&self, new_instrument: NewInstrument) -> Result<Instrument>;
}
