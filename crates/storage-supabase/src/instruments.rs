use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use crate::client::PostgrestClient;
use dailybars_core::errors::{DatabaseError, Error, Result};
use dailybars_core::instruments::{Instrument, InstrumentRepositoryTrait, NewInstrument};

pub(crate) const INSTRUMENTS_TABLE: &str = "instruments";

pub struct SupabaseInstrumentRepository {
    client: Arc<PostgrestClient>,
}

impl SupabaseInstrumentRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for SupabaseInstrumentRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        let filter = format!("eq.{}", symbol);
        let rows: Vec<Instrument> = self
            .client
            .select(
                INSTRUMENTS_TABLE,
                &[("select", "*"), ("symbol", filter.as_str()), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts with `ignore-duplicates` on the symbol key, so a row created
    /// concurrently is kept. When nothing is echoed back the existing row is
    /// read instead.
    async fn get_or_create(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        new_instrument.validate()?;

        let created: Vec<Instrument> = self
            .client
            .insert(
                INSTRUMENTS_TABLE,
                &[("on_conflict", "symbol")],
                "resolution=ignore-duplicates,return=representation",
                &[&new_instrument],
            )
            .await?;

        if let Some(instrument) = created.into_iter().next() {
            return Ok(instrument);
        }

        debug!(
            "Instrument {} already exists, reading it back",
            new_instrument.symbol
        );
        self.find_by_symbol(&new_instrument.symbol)
            .await?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Instrument {} was neither created nor found",
                    new_instrument.symbol
                )))
            })
    }
}
