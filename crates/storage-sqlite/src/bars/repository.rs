use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::{parse_date, BarDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::ohlcv_data::dsl;
use dailybars_core::bars::{BarRecord, BarRepositoryTrait};
use dailybars_core::constants::DEFAULT_BATCH_SIZE;
use dailybars_core::instruments::Instrument;
use dailybars_core::Result;
use dailybars_market_data::DailyBar;

pub struct BarRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    batch_size: usize,
}

impl BarRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self::with_batch_size(pool, writer, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(pool: Arc<DbPool>, writer: WriteHandle, batch_size: usize) -> Self {
        Self {
            pool,
            writer,
            batch_size: batch_size.max(1),
        }
    }

    /// All stored rows for an instrument, oldest first.
    pub fn bars_for_instrument(&self, instrument_id: &str) -> Result<Vec<BarRecord>> {
        let mut conn = get_connection(&self.pool)?;

        dsl::ohlcv_data
            .filter(dsl::instrument_id.eq(instrument_id))
            .order(dsl::date.asc())
            .select(BarDB::as_select())
            .load::<BarDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(|row| BarRecord::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl BarRepositoryTrait for BarRepository {
    async fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let latest = dsl::ohlcv_data
            .filter(dsl::instrument_id.eq(instrument_id))
            .select(diesel::dsl::max(dsl::date))
            .first::<Option<String>>(&mut conn)
            .into_core()?;

        latest
            .map(|date| parse_date(&date).map_err(Into::into))
            .transpose()
    }

    /// Replaces rows keyed by (instrument, date). All chunks for one
    /// instrument commit together or not at all.
    async fn upsert_bars(&self, instrument: &Instrument, bars: &[DailyBar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let rows: Vec<BarDB> = BarRecord::from_bars(instrument, bars)
            .iter()
            .map(BarDB::from)
            .collect();
        let batch_size = self.batch_size;
        debug!(
            "Upserting {} rows for {} in chunks of {}",
            rows.len(),
            instrument.symbol,
            batch_size
        );

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut total_upserted = 0;
                for chunk in rows.chunks(batch_size) {
                    total_upserted += diesel::replace_into(dsl::ohlcv_data)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                Ok(total_upserted)
            })
            .await
    }
}
