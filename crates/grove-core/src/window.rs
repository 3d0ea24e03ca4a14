//! Eligibility window calculation.
//!
//! A window is the half-open UTC interval `[start, end)` identifying "the
//! current period" for a cadence. Duplicate-completion checks key on the
//! window start, so the same `(cadence, instant)` pair must always map to
//! the same window. Pure function of its inputs; the caller supplies `now`.
//!
//! Cadence rules:
//! - `daily`: the current calendar day
//! - `weekly`: Monday 00:00 through the following Monday
//! - `monthly`: the current calendar month (December rolls into January)
//! - `yearly` (legacy): the current calendar year
//! - `one_time`: no branch of its own; falls back to the daily window, same
//!   as the calculator this replaced (kept deliberately, pinned by tests)

use crate::model::task::Cadence;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// A half-open eligibility interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Window start in microseconds since the Unix epoch.
    ///
    /// This is the deterministic period key persisted on completions and
    /// covered by the store's uniqueness constraint.
    #[must_use]
    pub fn start_us(&self) -> i64 {
        self.start.timestamp_micros()
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Compute the eligibility window containing `now` for a cadence.
#[must_use]
pub fn window_for(cadence: Cadence, now: DateTime<Utc>) -> Window {
    let today = now.date_naive();

    match cadence {
        Cadence::Weekly => {
            let monday =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            span(monday, monday + Duration::days(7))
        }
        Cadence::Monthly => {
            let first = today.with_day(1).expect("day 1 exists in every month");
            let next = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
            }
            .expect("first of next month is a valid date");
            span(first, next)
        }
        Cadence::Yearly => {
            let jan1 =
                NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("january 1 is a valid date");
            let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                .expect("january 1 is a valid date");
            span(jan1, next)
        }
        // one_time falls through to the daily window.
        Cadence::Daily | Cadence::OneTime => span(today, today + Duration::days(1)),
    }
}

fn span(start: NaiveDate, end: NaiveDate) -> Window {
    Window {
        start: midnight(start),
        end: midnight(end),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
