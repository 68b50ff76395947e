//! Trading window resolution

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::calendar::CalendarSource;
use crate::error::CalendarError;
use crate::types::TradingWindow;
use crate::DEFAULT_TIMEZONE;

/// Computes today's session window in a fixed reference zone
#[derive(Debug, Clone, Copy)]
pub struct MarketWindowResolver {
    timezone: Tz,
}

impl MarketWindowResolver {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Resolve the window for the local date of `now`
    ///
    /// A calendar entry dated after today means there is no session today. The
    /// bounds are built from today's date and the calendar's hour and minute.
    pub async fn resolve(
        &self,
        now: DateTime<Utc>,
        calendar: &dyn CalendarSource,
    ) -> Result<TradingWindow, CalendarError> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let day = calendar.trading_day(today).await?;

        if day.date > today {
            tracing::info!("Next trading day is {}, no session on {}", day.date, today);
            return Ok(TradingWindow::closed());
        }

        let open = self.localize(today, day.open)?;
        let close = self.localize(today, day.close)?;
        tracing::info!("Market window for {}: open {} close {}", today, open, close);

        Ok(TradingWindow::new(open, close))
    }

    fn localize(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, CalendarError> {
        let minute_only = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
            .ok_or_else(|| CalendarError::InvalidTime(time.to_string()))?;
        let local = date.and_time(minute_only);

        self.timezone.from_local_datetime(&local).earliest().ok_or_else(|| {
            CalendarError::NonexistentLocalTime { local, timezone: self.timezone.name().to_string() }
        })
    }
}

impl Default for MarketWindowResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayCalendar;
    use crate::types::TradingDay;
    use async_trait::async_trait;

    struct FixedDay(TradingDay);

    #[async_trait]
    impl CalendarSource for FixedDay {
        async fn trading_day(&self, _date: NaiveDate) -> Result<TradingDay, CalendarError> {
            Ok(self.0)
        }
    }

    struct Offline;

    #[async_trait]
    impl CalendarSource for Offline {
        async fn trading_day(&self, _date: NaiveDate) -> Result<TradingDay, CalendarError> {
            Err(CalendarError::unreachable("connection refused"))
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_regular_session() {
        let resolver = MarketWindowResolver::default();
        // 2025-03-12 13:00 UTC is 09:00 in New York (EDT)
        let window = resolver.resolve(utc(2025, 3, 12, 13, 0), &WeekdayCalendar::default()).await;
        let window = window.unwrap();

        let open = window.open.unwrap();
        let close = window.close.unwrap();
        assert_eq!(open.with_timezone(&Utc), utc(2025, 3, 12, 13, 30));
        assert_eq!(close.with_timezone(&Utc), utc(2025, 3, 12, 20, 0));
    }

    #[tokio::test]
    async fn test_future_trading_day_means_no_session() {
        let resolver = MarketWindowResolver::default();
        // Saturday
        let window =
            resolver.resolve(utc(2025, 3, 15, 15, 0), &WeekdayCalendar::default()).await.unwrap();
        assert_eq!(window, TradingWindow::closed());
        assert!(!window.has_session());
    }

    #[tokio::test]
    async fn test_uses_reference_zone_date() {
        let resolver = MarketWindowResolver::default();
        // Saturday 02:00 UTC is still Friday evening in New York
        let window =
            resolver.resolve(utc(2025, 3, 15, 2, 0), &WeekdayCalendar::default()).await.unwrap();
        assert!(window.has_session());
        assert_eq!(window.open.unwrap().date_naive(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn test_seconds_are_zeroed() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let calendar = FixedDay(TradingDay::new(
            today,
            NaiveTime::from_hms_milli_opt(9, 30, 42, 500).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 59).unwrap(),
        ));

        let window =
            MarketWindowResolver::default().resolve(utc(2025, 3, 12, 12, 0), &calendar).await;
        let window = window.unwrap();
        assert_eq!(window.open.unwrap().time(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(window.close.unwrap().time(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_calendar_failure_is_fatal() {
        let result = MarketWindowResolver::default().resolve(utc(2025, 3, 12, 12, 0), &Offline).await;
        assert!(matches!(result, Err(CalendarError::Unreachable(_))));
    }
}
