use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;

use super::error::PatternError;
use super::field::CronField;
use super::pattern::parse_pattern;

/// Upper bound on month advances inside `next_after`. Validated expressions
/// always land well before this (the worst real gap is the eight-year wait
/// for a leap-year February 29th); exhaustion surfaces as `None` instead of
/// an unbounded search.
const MONTH_SEARCH_LIMIT: usize = 200;

/// A parsed cron expression
///
/// Holds the six normalized fields (months 0-based, day-of-week 0=Sunday
/// with 7 folded) plus the verbatim pattern text for display. Immutable
/// after construction, so it can be evaluated freely from any number of
/// tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    pattern: String,
    seconds: CronField,
    minutes: CronField,
    hours: CronField,
    days: CronField,
    months: CronField,
    weekdays: CronField,
}

impl CronExpression {
    /// Parse a pattern, drawing `~` values from the thread rng and resolving
    /// `?` against the current local time.
    ///
    /// Accepts 5 columns (minute hour day month weekday, seconds defaulting
    /// to `0`) or 6 (with a leading seconds column), plus the `@yearly`,
    /// `@annually`, `@monthly`, `@weekly`, `@daily`, `@midnight` and
    /// `@hourly` nicknames.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostinato_runtime::CronExpression;
    ///
    /// // Every five minutes
    /// let expr = CronExpression::parse("*/5 * * * *").unwrap();
    ///
    /// // Weekdays at 09:30:00
    /// let expr = CronExpression::parse("0 30 9 * * mon-fri").unwrap();
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        Self::parse_with(pattern, Local::now().naive_local(), &mut rand::rng())
    }

    /// Parse with an explicit "now" for `?` substitution and an injected
    /// random source for `~` draws.
    ///
    /// Every `?` in one pattern sees the same `now`, and every `~` consumes
    /// exactly one draw here at construction; evaluation never touches the
    /// rng again.
    pub fn parse_with<R: Rng + ?Sized>(
        pattern: &str,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Result<Self, PatternError> {
        let fields = parse_pattern(pattern, now, rng)?;
        Ok(Self {
            pattern: pattern.to_string(),
            seconds: fields.seconds,
            minutes: fields.minutes,
            hours: fields.hours,
            days: fields.days,
            months: fields.months,
            weekdays: fields.weekdays,
        })
    }

    /// The verbatim pattern text this expression was parsed from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `at` satisfies this expression
    ///
    /// Seconds, minutes, hours and month must all match. When both day
    /// fields were authored (`restricted`), matching either one suffices,
    /// reproducing the historical cron OR rule; otherwise both must match,
    /// which degenerates to "the authored one must match".
    pub fn matches(&self, at: NaiveDateTime) -> bool {
        if !self.seconds.test(at.second())
            || !self.minutes.test(at.minute())
            || !self.hours.test(at.hour())
            || !self.months.test(at.month0())
        {
            return false;
        }
        let day = self.days.test(at.day());
        let weekday = self.weekdays.test(at.weekday().num_days_from_sunday());
        if self.days.restricted() && self.weekdays.restricted() {
            day || weekday
        } else {
            day && weekday
        }
    }

    /// Whether the current local time satisfies this expression
    pub fn matches_now(&self) -> bool {
        self.matches(Local::now().naive_local())
    }

    /// Next matching instant from the current local time
    pub fn next(&self) -> Option<NaiveDateTime> {
        self.next_after(Local::now().naive_local())
    }

    /// Smallest instant strictly after `after` satisfying this expression
    ///
    /// Pins fields finest to coarsest: each step either confirms the
    /// candidate or advances to the field's next value, resetting every
    /// finer field to its minimum and carrying into the coarser unit when
    /// the field is exhausted. Day-of-month and day-of-week resolve jointly,
    /// then the month (and year) close the carry chain.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        // One whole second past the floor of the start time
        let mut t = after.with_nanosecond(0)? + Duration::seconds(1);

        let second = t.second();
        if !self.seconds.test(second) {
            t = match self.seconds.next_after(second) {
                Some(s) => t.with_second(s)?,
                None => t.with_second(self.seconds.min())? + Duration::minutes(1),
            };
        }

        let minute = t.minute();
        if !self.minutes.test(minute) {
            t = t.with_second(self.seconds.min())?;
            t = match self.minutes.next_after(minute) {
                Some(m) => t.with_minute(m)?,
                None => t.with_minute(self.minutes.min())? + Duration::hours(1),
            };
        }

        let hour = t.hour();
        if !self.hours.test(hour) {
            t = t.with_second(self.seconds.min())?.with_minute(self.minutes.min())?;
            t = match self.hours.next_after(hour) {
                Some(h) => t.with_hour(h)?,
                None => t.with_hour(self.hours.min())? + Duration::days(1),
            };
        }

        for _ in 0..MONTH_SEARCH_LIMIT {
            t = self.resolve_day(t)?;
            if self.months.test(t.month0()) {
                return Some(t);
            }
            // Advance the month (carrying into the year), pin the day to the
            // 1st and re-resolve: day validity depends on the month reached.
            let (year, month0) = match self.months.next_after(t.month0()) {
                Some(m) => (t.year(), m),
                None => (t.year() + 1, self.months.min()),
            };
            t = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?.and_hms_opt(
                self.hours.min(),
                self.minutes.min(),
                self.seconds.min(),
            )?;
        }
        None
    }

    /// The date-or-day step: candidates from advancing day-of-month alone
    /// and day-of-week alone. Both fields authored picks the earlier (only
    /// one needs to hold); otherwise the later, since an unauthored field's
    /// candidate is the unchanged start and the authored one must actually
    /// advance.
    fn resolve_day(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let by_date = self.next_date(t)?;
        let by_weekday = self.next_weekday(t)?;
        if self.days.restricted() && self.weekdays.restricted() {
            Some(by_date.min(by_weekday))
        } else {
            Some(by_date.max(by_weekday))
        }
    }

    fn next_date(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        if self.days.test(t.day()) {
            return Some(t);
        }
        let mut year = t.year();
        let mut month = t.month();
        let day = match self.days.next_after(t.day()) {
            Some(d) if d <= days_in_month(year, month) => d,
            // No day left in this month: field minimum of the next month
            // long enough to hold it.
            _ => loop {
                let rolled = next_month(year, month);
                year = rolled.0;
                month = rolled.1;
                if self.days.min() <= days_in_month(year, month) {
                    break self.days.min();
                }
            },
        };
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(
            self.hours.min(),
            self.minutes.min(),
            self.seconds.min(),
        )
    }

    fn next_weekday(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let current = t.weekday().num_days_from_sunday();
        if self.weekdays.test(current) {
            return Some(t);
        }
        // Modular walk around the 7-day wheel
        let target = match self.weekdays.next_after(current) {
            Some(d) => d,
            None => self.weekdays.min(),
        };
        let ahead = (target + 7 - current) % 7;
        let date = t.date() + Duration::days(i64::from(ahead));
        date.and_hms_opt(self.hours.min(), self.minutes.min(), self.seconds.min())
    }
}

impl FromStr for CronExpression {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

fn is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
