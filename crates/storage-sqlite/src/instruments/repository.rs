use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::InstrumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::instruments::dsl;
use dailybars_core::instruments::{Instrument, InstrumentRepositoryTrait, NewInstrument};
use dailybars_core::Result;

pub struct InstrumentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for InstrumentRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let row = dsl::instruments
            .filter(dsl::symbol.eq(symbol))
            .select(InstrumentDB::as_select())
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_core()?;

        row.map(|r| Instrument::try_from(r).map_err(Into::into))
            .transpose()
    }

    /// Inserts the instrument unless its symbol already exists, then returns
    /// the stored row. Both steps share one write transaction.
    async fn get_or_create(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        new_instrument.validate()?;
        let row = InstrumentDB::from_new(&new_instrument, Utc::now());

        let stored = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InstrumentDB> {
                diesel::insert_or_ignore_into(dsl::instruments)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;

                dsl::instruments
                    .filter(dsl::symbol.eq(&row.symbol))
                    .select(InstrumentDB::as_select())
                    .first::<InstrumentDB>(conn)
                    .into_core()
            })
            .await?;

        Instrument::try_from(stored).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use dailybars_market_data::{resolve_symbol, AssetType};
    use tempfile::tempdir;

    async fn create_test_repository() -> (InstrumentRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = init(&temp_dir.path().join("test.db").to_string_lossy())
            .expect("Failed to init database");
        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (InstrumentRepository::new(pool, writer), temp_dir)
    }

    #[tokio::test]
    async fn test_find_missing_symbol_returns_none() {
        let (repo, _temp_dir) = create_test_repository().await;
        assert!(repo.find_by_symbol("AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let (repo, _temp_dir) = create_test_repository().await;

        let first = repo
            .get_or_create(NewInstrument::from_resolved(&resolve_symbol("^GSPC")))
            .await
            .unwrap();
        let second = repo
            .get_or_create(NewInstrument::from_resolved(&resolve_symbol("^GSPC")))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.asset_type, AssetType::Index);
        assert_eq!(first.provider_ticker.as_deref(), Some("SPY"));
        assert!(first.created_at.is_some());

        let found = repo.find_by_symbol("^GSPC").await.unwrap().unwrap();
        assert_eq!(found, first);
    }

    #[tokio::test]
    async fn test_get_or_create_rejects_blank_symbol() {
        let (repo, _temp_dir) = create_test_repository().await;
        let mut new = NewInstrument::from_resolved(&resolve_symbol("AAPL"));
        new.symbol = String::new();

        assert!(repo.get_or_create(new).await.is_err());
    }
}
