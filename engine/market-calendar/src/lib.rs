//! # MarketCalendar
//!
//! Resolves today's trading window from a calendar source and decides whether a
//! session may start, blocking until the open when it is still ahead.
//!
//! The window is computed once per run and handed to every consumer by value; nothing
//! in this crate keeps process-wide state.

pub mod calendar;
pub mod clock;
pub mod error;
pub mod gate;
pub mod types;
pub mod window;

pub use calendar::{CalendarSource, WeekdayCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CalendarError;
pub use gate::ReadinessGate;
pub use types::{TradingDay, TradingWindow};
pub use window::MarketWindowResolver;

/// Re-export so callers can name zones without depending on chrono-tz directly
pub use chrono_tz::Tz;

/// Reference zone for US equity sessions
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Margin added on top of the pre-open wait so the session starts after the bell
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 1;
