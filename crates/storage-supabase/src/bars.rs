use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::sync::Arc;

use crate::client::PostgrestClient;
use dailybars_core::bars::{BarRecord, BarRepositoryTrait};
use dailybars_core::constants::DEFAULT_BATCH_SIZE;
use dailybars_core::instruments::Instrument;
use dailybars_core::Result;
use dailybars_market_data::DailyBar;

pub(crate) const BARS_TABLE: &str = "ohlcv_data";
const BARS_CONFLICT_KEY: &str = "instrument_id,date";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Deserialize)]
struct DateRow {
    date: NaiveDate,
}

pub struct SupabaseBarRepository {
    client: Arc<PostgrestClient>,
    batch_size: usize,
}

impl SupabaseBarRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self::with_batch_size(client, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(client: Arc<PostgrestClient>, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl BarRepositoryTrait for SupabaseBarRepository {
    async fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>> {
        let filter = format!("eq.{}", instrument_id);
        let rows: Vec<DateRow> = self
            .client
            .select(
                BARS_TABLE,
                &[
                    ("select", "date"),
                    ("instrument_id", filter.as_str()),
                    ("order", "date.desc"),
                    ("limit", "1"),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.date))
    }

    /// Each chunk is one request and commits on its own. A failure part way
    /// leaves earlier chunks stored, which the next run's overlap rewrites.
    async fn upsert_bars(&self, instrument: &Instrument, bars: &[DailyBar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let rows = BarRecord::from_bars(instrument, bars);
        let mut total_upserted = 0;
        for chunk in rows.chunks(self.batch_size) {
            debug!(
                "Upserting {} rows for {} ({}/{})",
                chunk.len(),
                instrument.symbol,
                total_upserted + chunk.len(),
                rows.len()
            );
            let _: Vec<serde_json::Value> = self
                .client
                .insert(
                    BARS_TABLE,
                    &[("on_conflict", BARS_CONFLICT_KEY)],
                    UPSERT_PREFER,
                    chunk,
                )
                .await?;
            total_upserted += chunk.len();
        }
        Ok(total_upserted)
    }
}
