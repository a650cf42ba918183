use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use dailybars_market_data::{DailyBar, IntradayBar};

struct DayAccumulator {
    first_ts: NaiveDateTime,
    last_ts: NaiveDateTime,
    bar: DailyBar,
}

/// Fold intraday bars into one daily bar per calendar date.
///
/// Open comes from the earliest timestamp of the day and close from the
/// latest. High and low are the extremes, volume is summed (missing volume
/// counts as 0). Input order does not matter; output is sorted by date.
pub fn aggregate_intraday_to_daily(bars: &[IntradayBar]) -> Vec<DailyBar> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for bar in bars {
        let volume = bar.volume.unwrap_or(0);
        match days.get_mut(&bar.date()) {
            None => {
                days.insert(
                    bar.date(),
                    DayAccumulator {
                        first_ts: bar.timestamp,
                        last_ts: bar.timestamp,
                        bar: DailyBar::new(
                            bar.date(),
                            bar.open,
                            bar.high,
                            bar.low,
                            bar.close,
                            volume,
                        ),
                    },
                );
            }
            Some(day) => {
                day.bar.high = day.bar.high.max(bar.high);
                day.bar.low = day.bar.low.min(bar.low);
                day.bar.volume += volume;
                if bar.timestamp < day.first_ts {
                    day.first_ts = bar.timestamp;
                    day.bar.open = bar.open;
                }
                if bar.timestamp > day.last_ts {
                    day.last_ts = bar.timestamp;
                    day.bar.close = bar.close;
                }
            }
        }
    }

    days.into_values().map(|day| day.bar).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bar(
        ts: &str,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Option<i64>,
    ) -> IntradayBar {
        IntradayBar {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_aggregates_single_day_out_of_order() {
        let bars = vec![
            bar("2025-09-22 15:00:00", dec!(102), dec!(104), dec!(101), dec!(103.5), Some(300)),
            bar("2025-09-22 13:00:00", dec!(100), dec!(101), dec!(99), dec!(100.5), Some(100)),
            bar("2025-09-22 14:00:00", dec!(100.5), dec!(102.5), dec!(98.5), dec!(102), None),
        ];

        let daily = aggregate_intraday_to_daily(&bars);
        assert_eq!(daily.len(), 1);
        let day = &daily[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 9, 22).unwrap());
        assert_eq!(day.open, dec!(100));
        assert_eq!(day.close, dec!(103.5));
        assert_eq!(day.high, dec!(104));
        assert_eq!(day.low, dec!(98.5));
        assert_eq!(day.volume, 400);
    }

    #[test]
    fn test_splits_by_calendar_date() {
        let bars = vec![
            bar("2025-09-23 10:00:00", dec!(5), dec!(6), dec!(4), dec!(5.5), Some(10)),
            bar("2025-09-22 10:00:00", dec!(1), dec!(2), dec!(0.5), dec!(1.5), Some(20)),
        ];

        let daily = aggregate_intraday_to_daily(&bars);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2025, 9, 22).unwrap());
        assert_eq!(daily[0].volume, 20);
        assert_eq!(daily[1].open, dec!(5));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_intraday_to_daily(&[]).is_empty());
    }
}
