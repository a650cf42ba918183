use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use dailybars_market_data::{AssetType, ResolvedSymbol};

use crate::constants::{DEFAULT_CURRENCY, PROVIDER_NAME};

/// Instrument metadata row. Identity key is `symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Text or bigint key, depending on how the table was created
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    /// Symbol as the user configured it (e.g. `^GSPC`)
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub provider: String,
    pub currency: String,
    /// Ticker actually queried at the provider (e.g. `SPY`)
    #[serde(default)]
    pub provider_ticker: Option<String>,
    /// `timestamptz`, or a `timestamp` without zone read as UTC
    #[serde(default, deserialize_with = "utc_from_zoned_or_naive")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Zoned(DateTime<Utc>),
    Naive(NaiveDateTime),
}

fn utc_from_zoned_or_naive<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawTimestamp>::deserialize(deserializer)?.map(|raw| match raw {
            RawTimestamp::Zoned(at) => at,
            RawTimestamp::Naive(at) => at.and_utc(),
        }),
    )
}

/// Input model for creating a new instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstrument {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub provider: String,
    pub currency: String,
    pub provider_ticker: Option<String>,
}

impl NewInstrument {
    /// Build the row written on first encounter of a symbol.
    pub fn from_resolved(resolved: &ResolvedSymbol) -> Self {
        Self {
            symbol: resolved.symbol.clone(),
            name: resolved.symbol.clone(),
            asset_type: resolved.asset_type,
            provider: PROVIDER_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            provider_ticker: Some(resolved.ticker.clone()),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(crate::Error::Validation(
                "Instrument symbol cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailybars_market_data::resolve_symbol;

    #[test]
    fn test_new_instrument_from_proxy() {
        let new = NewInstrument::from_resolved(&resolve_symbol("^GSPC"));
        assert_eq!(new.symbol, "^GSPC");
        assert_eq!(new.name, "^GSPC");
        assert_eq!(new.asset_type, AssetType::Index);
        assert_eq!(new.provider, "Alpha Vantage");
        assert_eq!(new.currency, "USD");
        assert_eq!(new.provider_ticker.as_deref(), Some("SPY"));
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_instrument_type_column_name() {
        let new = NewInstrument::from_resolved(&resolve_symbol("BTC-USD"));
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["type"], "crypto");
        assert_eq!(json["provider_ticker"], "BTC-USD");
    }

    #[test]
    fn test_instrument_deserializes_without_optional_columns() {
        let instrument: Instrument = serde_json::from_value(serde_json::json!({
            "id": "3f1c",
            "symbol": "AAPL",
            "name": "AAPL",
            "type": "equity",
            "provider": "Alpha Vantage",
            "currency": "USD"
        }))
        .unwrap();
        assert_eq!(instrument.asset_type, AssetType::Equity);
        assert!(instrument.provider_ticker.is_none());
        assert!(instrument.created_at.is_none());
    }

    #[test]
    fn test_instrument_accepts_bigint_id_and_naive_timestamp() {
        let instrument: Instrument = serde_json::from_value(serde_json::json!({
            "id": 42,
            "symbol": "^GSPC",
            "name": "^GSPC",
            "type": "index",
            "provider": "Alpha Vantage",
            "currency": "USD",
            "provider_ticker": null,
            "created_at": "2024-03-01T12:00:00.123456"
        }))
        .unwrap();
        assert_eq!(instrument.id, "42");
        assert_eq!(
            instrument.created_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00.123456+00:00"
        );

        let instrument: Instrument = serde_json::from_value(serde_json::json!({
            "id": "3f1c",
            "symbol": "AAPL",
            "name": "AAPL",
            "type": "equity",
            "provider": "Alpha Vantage",
            "currency": "USD",
            "created_at": "2024-03-01T12:00:00+02:00"
        }))
        .unwrap();
        assert_eq!(
            instrument.created_at.unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_empty_symbol_is_rejected() {
        let mut new = NewInstrument::from_resolved(&resolve_symbol("AAPL"));
        new.symbol = "  ".to_string();
        assert!(new.validate().is_err());
    }
}
