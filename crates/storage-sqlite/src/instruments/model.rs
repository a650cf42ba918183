//! Database model for instruments.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use crate::errors::StorageError;
use dailybars_core::instruments::{Instrument, NewInstrument};
use dailybars_market_data::AssetType;

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
    pub provider: String,
    pub currency: String,
    pub provider_ticker: Option<String>,
    pub created_at: String,
}

impl InstrumentDB {
    pub fn from_new(new_instrument: &NewInstrument, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: new_instrument.symbol.clone(),
            name: new_instrument.name.clone(),
            asset_type: new_instrument.asset_type.as_str().to_string(),
            provider: new_instrument.provider.clone(),
            currency: new_instrument.currency.clone(),
            provider_ticker: new_instrument.provider_ticker.clone(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl TryFrom<InstrumentDB> for Instrument {
    type Error = StorageError;

    fn try_from(db: InstrumentDB) -> std::result::Result<Self, Self::Error> {
        let asset_type = AssetType::from_str(&db.asset_type).map_err(StorageError::InvalidValue)?;
        // Rows written by other tools may carry a timestamp we cannot parse.
        let created_at = DateTime::parse_from_rfc3339(&db.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Instrument {
            id: db.id,
            symbol: db.symbol,
            name: db.name,
            asset_type,
            provider: db.provider,
            currency: db.currency,
            provider_ticker: db.provider_ticker,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dailybars_market_data::resolve_symbol;

    #[test]
    fn test_round_trip_through_db_row() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let row = InstrumentDB::from_new(
            &NewInstrument::from_resolved(&resolve_symbol("^gspc")),
            created_at,
        );
        assert_eq!(row.asset_type, "index");
        assert_eq!(row.created_at, "2024-03-01T12:00:00Z");

        let instrument = Instrument::try_from(row.clone()).unwrap();
        assert_eq!(instrument.id, row.id);
        assert_eq!(instrument.symbol, "^GSPC");
        assert_eq!(instrument.provider_ticker.as_deref(), Some("SPY"));
        assert_eq!(instrument.created_at, Some(created_at));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut row = InstrumentDB::from_new(
            &NewInstrument::from_resolved(&resolve_symbol("AAPL")),
            Utc::now(),
        );
        row.asset_type = "bond".to_string();
        assert!(matches!(
            Instrument::try_from(row),
            Err(StorageError::InvalidValue(_))
        ));
    }
}
