use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Inclusive date window requested from the provider for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl FetchWindow {
    /// Plan the incremental window.
    ///
    /// With stored bars the window starts `overlap_days` before the latest
    /// stored date, so recent corrections get rewritten. Without stored bars
    /// it starts at `default_start`. It always ends `today`; a start past
    /// `today` is clamped. An overlap reaching before the earliest
    /// representable date falls back to `default_start`.
    pub fn plan(
        latest_stored: Option<NaiveDate>,
        overlap_days: i64,
        default_start: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let since = match latest_stored {
            Some(latest) => Duration::try_days(overlap_days)
                .and_then(|overlap| latest.checked_sub_signed(overlap))
                .unwrap_or(default_start),
            None => default_start,
        };

        Self {
            since: since.min(today),
            until: today,
        }
    }

    /// Start of the window as a timestamp, for intraday fetches.
    pub fn since_start_of_day(&self) -> NaiveDateTime {
        self.since.and_time(NaiveTime::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_without_stored_bars_uses_default_start() {
        let window = FetchWindow::plan(None, 1, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since, date(2022, 1, 1));
        assert_eq!(window.until, date(2024, 6, 3));
    }

    #[test]
    fn test_window_overlaps_latest_stored_date() {
        let window = FetchWindow::plan(Some(date(2024, 6, 1)), 1, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since, date(2024, 5, 31));

        let window = FetchWindow::plan(Some(date(2024, 6, 1)), 0, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since, date(2024, 6, 1));
    }

    #[test]
    fn test_window_start_is_clamped_to_today() {
        let window = FetchWindow::plan(Some(date(2024, 6, 10)), 1, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since, date(2024, 6, 3));
        assert_eq!(window.until, date(2024, 6, 3));
    }

    #[test]
    fn test_oversized_overlap_falls_back_to_default_start() {
        let window = FetchWindow::plan(
            Some(date(2024, 6, 1)),
            200_000_000,
            date(2022, 1, 1),
            date(2024, 6, 3),
        );
        assert_eq!(window.since, date(2022, 1, 1));

        let window = FetchWindow::plan(Some(date(2024, 6, 1)), i64::MAX, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since, date(2022, 1, 1));
    }

    #[test]
    fn test_since_start_of_day() {
        let window = FetchWindow::plan(None, 1, date(2022, 1, 1), date(2024, 6, 3));
        assert_eq!(window.since_start_of_day().to_string(), "2022-01-01 00:00:00");
    }
}
