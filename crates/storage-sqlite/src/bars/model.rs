//! Database model for daily OHLCV rows.
//!
//! Prices are stored as decimal text so no precision is lost between the
//! provider payload and the table.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use dailybars_core::bars::BarRecord;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ohlcv_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BarDB {
    pub instrument_id: String,
    pub instrument_symbol: String,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
}

impl From<&BarRecord> for BarDB {
    fn from(record: &BarRecord) -> Self {
        Self {
            instrument_id: record.instrument_id.clone(),
            instrument_symbol: record.instrument_symbol.clone(),
            date: record.date.format(DATE_FORMAT).to_string(),
            open: record.open.to_string(),
            high: record.high.to_string(),
            low: record.low.to_string(),
            close: record.close.to_string(),
            volume: record.volume,
        }
    }
}

impl TryFrom<BarDB> for BarRecord {
    type Error = StorageError;

    fn try_from(db: BarDB) -> std::result::Result<Self, Self::Error> {
        Ok(BarRecord {
            date: parse_date(&db.date)?,
            open: parse_decimal("open", &db.open)?,
            high: parse_decimal("high", &db.high)?,
            low: parse_decimal("low", &db.low)?,
            close: parse_decimal("close", &db.close)?,
            instrument_id: db.instrument_id,
            instrument_symbol: db.instrument_symbol,
            volume: db.volume,
        })
    }
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| StorageError::InvalidValue(format!("date '{}': {}", value, e)))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::InvalidValue(format!("{} '{}': {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_text_keeps_precision() {
        let record = BarRecord {
            instrument_id: "inst-1".to_string(),
            instrument_symbol: "BTC-USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            open: dec!(61130.98000000),
            high: dec!(63676.35),
            low: dec!(60364.7),
            close: dec!(61132.04),
            volume: 47_560,
        };

        let row = BarDB::from(&record);
        assert_eq!(row.date, "2024-02-29");
        assert_eq!(row.open, "61130.98000000");

        assert_eq!(BarRecord::try_from(row).unwrap(), record);
    }

    #[test]
    fn test_bad_date_is_reported() {
        let err = parse_date("29/02/2024").unwrap_err();
        assert!(err.to_string().contains("29/02/2024"));
    }
}
