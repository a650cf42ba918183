use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dailybars_market_data::DailyBar;

use crate::instruments::Instrument;

/// A stored `ohlcv_data` row. Identity key is `(instrument_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarRecord {
    pub instrument_id: String,
    /// Denormalized copy of the instrument's user-facing symbol
    pub instrument_symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl BarRecord {
    pub fn from_bar(instrument: &Instrument, bar: &DailyBar) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            instrument_symbol: instrument.symbol.clone(),
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    /// Rows for one instrument, in input order.
    pub fn from_bars(instrument: &Instrument, bars: &[DailyBar]) -> Vec<Self> {
        bars.iter().map(|bar| Self::from_bar(instrument, bar)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailybars_market_data::AssetType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_bars_carries_instrument_identity() {
        let instrument = Instrument {
            id: "inst-1".to_string(),
            symbol: "^GSPC".to_string(),
            name: "^GSPC".to_string(),
            asset_type: AssetType::Index,
            provider: "Alpha Vantage".to_string(),
            currency: "USD".to_string(),
            provider_ticker: Some("SPY".to_string()),
            created_at: None,
        };
        let bars = vec![DailyBar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            dec!(472.16),
            dec!(473.67),
            dec!(470.49),
            dec!(472.65),
            123_623_700,
        )];

        let rows = BarRecord::from_bars(&instrument, &bars);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instrument_id, "inst-1");
        assert_eq!(rows[0].instrument_symbol, "^GSPC");
        assert_eq!(rows[0].close, dec!(472.65));
        assert_eq!(rows[0].volume, 123_623_700);
    }
}
