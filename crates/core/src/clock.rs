//! Injected time source
//!
//! Components below the facade never read the wall clock themselves; they
//! take a [`Clock`] so tests can pin "today" to any date.

use crate::types::DateBucket;
use chrono::{Duration, Local, NaiveDate, Utc};
use parking_lot::Mutex;

/// Source of the current date and timestamp
pub trait Clock: Send + Sync {
    /// Today's calendar date in the user's local time zone
    fn today(&self) -> NaiveDate;

    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Today's bucket according to `clock`
pub fn current_date_bucket(clock: &dyn Clock) -> DateBucket {
    DateBucket::from_date(clock.today())
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replays
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pinmark_core::{current_date_bucket, FixedClock};
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// assert_eq!(current_date_bucket(&clock).as_str(), "20250101");
/// clock.advance_days(1);
/// assert_eq!(current_date_bucket(&clock).as_str(), "20250102");
/// ```
#[derive(Debug)]
pub struct FixedClock {
    state: Mutex<(NaiveDate, i64)>,
}

impl FixedClock {
    /// Clock pinned to midnight UTC of `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            state: Mutex::new((date, midnight_millis(date))),
        }
    }

    /// Clock pinned to the date encoded by `bucket`
    pub fn at_bucket(bucket: &DateBucket) -> Option<Self> {
        NaiveDate::parse_from_str(bucket.as_str(), "%Y%m%d")
            .ok()
            .map(Self::new)
    }

    /// Jump to `date`
    pub fn set_date(&self, date: NaiveDate) {
        *self.state.lock() = (date, midnight_millis(date));
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: i64) {
        let mut state = self.state.lock();
        let date = state.0 + Duration::days(days);
        *state = (date, midnight_millis(date));
    }

    /// Move the timestamp forward without changing the date
    pub fn tick(&self, millis: i64) {
        self.state.lock().1 += millis;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.state.lock().0
    }

    fn now_millis(&self) -> i64 {
        self.state.lock().1
    }
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}
