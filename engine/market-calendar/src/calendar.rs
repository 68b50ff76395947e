//! Calendar sources

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};

use crate::error::CalendarError;
use crate::types::TradingDay;

/// How far ahead the weekday calendar looks for the next session
const MAX_LOOKAHEAD_DAYS: u64 = 14;

/// Source of trading days
///
/// Implementations return the trading day for `date`, or the next one after it when
/// the market is closed on `date`.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn trading_day(&self, date: NaiveDate) -> Result<TradingDay, CalendarError>;
}

/// Regular-hours calendar: Monday to Friday, minus a configured holiday list
#[derive(Debug, Clone)]
pub struct WeekdayCalendar {
    open: NaiveTime,
    close: NaiveTime,
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, CalendarError> {
        if open >= close {
            return Err(CalendarError::InvalidTime(format!(
                "open {open} must be before close {close}"
            )));
        }
        Ok(Self { open, close, holidays: BTreeSet::new() })
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn is_trading_date(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

impl Default for WeekdayCalendar {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            holidays: BTreeSet::new(),
        }
    }
}

#[async_trait]
impl CalendarSource for WeekdayCalendar {
    async fn trading_day(&self, date: NaiveDate) -> Result<TradingDay, CalendarError> {
        (0..=MAX_LOOKAHEAD_DAYS)
            .filter_map(|offset| date.checked_add_days(Days::new(offset)))
            .find(|candidate| self.is_trading_date(*candidate))
            .map(|day| TradingDay::new(day, self.open, self.close))
            .ok_or(CalendarError::NoEntry { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_weekday_returns_same_date() {
        let calendar = WeekdayCalendar::default();
        // Wednesday
        let day = calendar.trading_day(date(2025, 3, 12)).await.unwrap();
        assert_eq!(day.date, date(2025, 3, 12));
        assert_eq!(day.open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(day.close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_weekend_rolls_to_monday() {
        let calendar = WeekdayCalendar::default();
        let day = calendar.trading_day(date(2025, 3, 15)).await.unwrap();
        assert_eq!(day.date, date(2025, 3, 17));
    }

    #[tokio::test]
    async fn test_holiday_is_skipped() {
        let calendar = WeekdayCalendar::default().with_holidays([date(2025, 7, 4)]);
        let day = calendar.trading_day(date(2025, 7, 4)).await.unwrap();
        // Friday holiday, next session is Monday
        assert_eq!(day.date, date(2025, 7, 7));
    }

    #[tokio::test]
    async fn test_no_entry_when_everything_is_a_holiday() {
        let start = date(2025, 1, 1);
        let holidays = (0..30).map(|d| start + Days::new(d));
        let calendar = WeekdayCalendar::default().with_holidays(holidays);

        let result = calendar.trading_day(start).await;
        assert_eq!(result, Err(CalendarError::NoEntry { date: start }));
    }

    #[test]
    fn test_open_must_precede_close() {
        let open = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        let close = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert!(WeekdayCalendar::new(open, close).is_err());
    }
}
