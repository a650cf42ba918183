use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data for a single ticker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date (exchange calendar date, no time component)
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Traded volume. Providers that omit volume yield 0.
    pub volume: i64,
}

impl DailyBar {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A single intraday bar (e.g. one 60min candle).
///
/// Intraday bars are never stored directly; they are folded into
/// [`DailyBar`]s before reaching the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntradayBar {
    /// Bar timestamp as reported by the provider (exchange local time)
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
}

impl IntradayBar {
    /// Calendar date this bar belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_intraday_bar_date() {
        let bar = IntradayBar {
            timestamp: NaiveDate::from_ymd_opt(2025, 9, 22)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap(),
            open: dec!(1),
            high: dec!(2),
            low: dec!(0.5),
            close: dec!(1.5),
            volume: None,
        };
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2025, 9, 22).unwrap());
    }
}
