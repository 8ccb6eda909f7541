use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::Rng;

use super::error::PatternError;
use super::field::CronField;

/// Nickname patterns, matched against the whole input case-insensitively.
const NICKNAMES: &[(&str, &str)] = &[
    ("@yearly", "0 0 0 1 1 *"),
    ("@annually", "0 0 0 1 1 *"),
    ("@monthly", "0 0 0 1 * *"),
    ("@weekly", "0 0 0 * * 0"),
    ("@daily", "0 0 0 * * *"),
    ("@midnight", "0 0 0 * * *"),
    ("@hourly", "0 0 * * * *"),
];

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Longest possible length of each 1-based month; February counts its
/// leap-year 29 since validity only requires that some year can hold the day.
pub(crate) const MONTH_MAX_DAYS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Seconds,
    Minutes,
    Hours,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Column {
    /// Input limits, before the 0-basing and 7-folding rewrites. The
    /// day-of-week ceiling is 7: accepted as an input alias for Sunday and as
    /// the upper-bound mapping of `sun`/`?`.
    fn limits(self) -> (u32, u32) {
        match self {
            Column::Seconds | Column::Minutes => (0, 59),
            Column::Hours => (0, 23),
            Column::DayOfMonth => (1, 31),
            Column::Month => (1, 12),
            Column::DayOfWeek => (0, 7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundPos {
    Lower,
    Upper,
}

/// The six normalized fields of a parsed pattern, months already 0-based and
/// day-of-week 7 folded onto Sunday.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedFields {
    pub(crate) seconds: CronField,
    pub(crate) minutes: CronField,
    pub(crate) hours: CronField,
    pub(crate) days: CronField,
    pub(crate) months: CronField,
    pub(crate) weekdays: CronField,
}

/// Parse `pattern` into six fields.
///
/// `now` supplies the values substituted for `?` bounds; it is captured once
/// by the caller so every `?` in one pattern sees the same instant. `rng`
/// supplies the uniform draws consumed by `~` sub-fields; each occurrence
/// draws exactly once, here, never at evaluation time.
pub(crate) fn parse_pattern<R: Rng + ?Sized>(
    pattern: &str,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<ParsedFields, PatternError> {
    let mut parser = Parser { pattern, now, rng };
    parser.parse()
}

struct Parser<'a, R: Rng + ?Sized> {
    /// Verbatim input, carried into every error unmodified.
    pattern: &'a str,
    now: NaiveDateTime,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Parser<'_, R> {
    fn parse(&mut self) -> Result<ParsedFields, PatternError> {
        let trimmed = self.pattern.trim();
        let substituted = NICKNAMES
            .iter()
            .find(|(nick, _)| trimmed.eq_ignore_ascii_case(nick))
            .map(|(_, expansion)| *expansion)
            .unwrap_or(trimmed);

        let mut columns: Vec<&str> = substituted.split_whitespace().collect();
        match columns.len() {
            // The seconds column is optional and defaults to 0
            5 => columns.insert(0, "0"),
            6 => {}
            _ => return Err(self.syntax()),
        }

        let seconds = self.parse_column(Column::Seconds, columns[0])?;
        let minutes = self.parse_column(Column::Minutes, columns[1])?;
        let hours = self.parse_column(Column::Hours, columns[2])?;
        let days = self.parse_column(Column::DayOfMonth, columns[3])?;
        let months = self.parse_column(Column::Month, columns[4])?;
        let weekdays = self.parse_column(Column::DayOfWeek, columns[5])?;

        // The smallest requested day-of-month must fit the longest allowed
        // month, or the pattern could never fire on any day.
        let longest = months
            .values()
            .iter()
            .map(|&m| MONTH_MAX_DAYS[(m - 1) as usize])
            .max()
            .unwrap_or(31);
        if days.min() > longest {
            return Err(self.range());
        }

        Ok(ParsedFields {
            seconds,
            minutes,
            hours,
            days,
            months: months.map(|m| m - 1),
            weekdays: weekdays.map(|d| if d == 7 { 0 } else { d }),
        })
    }

    fn parse_column(&mut self, column: Column, text: &str) -> Result<CronField, PatternError> {
        let mut parts = Vec::new();
        for sub in text.split(',') {
            if sub.is_empty() {
                return Err(self.syntax());
            }
            parts.push(self.parse_subfield(column, sub)?);
        }
        // Only the bare wildcard leaves the column unconstrained; `*/1` and
        // friends count as authored restrictions even when the value sets end
        // up identical.
        Ok(CronField::flatten(parts, text != "*"))
    }

    fn parse_subfield(&mut self, column: Column, text: &str) -> Result<CronField, PatternError> {
        let (min, max) = column.limits();

        if text == "*" {
            return Ok(CronField::all(min, max));
        }

        let (body, step) = match text.split_once('/') {
            Some((body, step_txt)) => {
                let step = step_txt.parse::<u32>().map_err(|_| self.syntax())?;
                if step == 0 {
                    return Err(self.range());
                }
                (body, Some(step))
            }
            None => (text, None),
        };

        if body == "*" {
            return Ok(CronField::range(min, max, step.unwrap_or(1)));
        }

        if let Some((lo_txt, hi_txt)) = body.split_once('~') {
            let lo = if lo_txt.is_empty() {
                min
            } else {
                self.bound(column, lo_txt, BoundPos::Lower)?
            };
            let hi = if hi_txt.is_empty() {
                max
            } else {
                self.bound(column, hi_txt, BoundPos::Upper)?
            };
            self.check_bounds(column, lo, hi)?;
            let span = hi - lo + 1;
            let draw: f64 = self.rng.random();
            let value = lo + (draw * f64::from(span)) as u32;
            // Without an explicit step the step outruns the span, so only the
            // drawn value survives; with one, the stepped range starts at a
            // random phase.
            return Ok(CronField::range(value, hi, step.unwrap_or(span + 1)));
        }

        if let Some((lo_txt, hi_txt)) = body.split_once('-') {
            if lo_txt.is_empty() || hi_txt.is_empty() {
                return Err(self.syntax());
            }
            let lo = self.bound(column, lo_txt, BoundPos::Lower)?;
            let hi = self.bound(column, hi_txt, BoundPos::Upper)?;
            self.check_bounds(column, lo, hi)?;
            return Ok(CronField::range(lo, hi, step.unwrap_or(1)));
        }

        if step.is_some() {
            // `N/step` is not an accepted form
            return Err(self.syntax());
        }
        let value = self.bound(column, body, BoundPos::Lower)?;
        self.check_bounds(column, value, value)?;
        Ok(CronField::range(value, value, 1))
    }

    /// Resolve one bound token: `?` (the captured "now"), a month/weekday
    /// name, or a plain integer. Sunday resolves to 7 in upper-bound
    /// position so ranges like `6-sun` run Saturday through Sunday without
    /// wrapping.
    fn bound(&self, column: Column, text: &str, pos: BoundPos) -> Result<u32, PatternError> {
        let value = if text == "?" {
            self.now_value(column)
        } else if let Some(named) = name_value(column, text) {
            named
        } else {
            // Plain integers pass through untouched; an authored 7 is already
            // a valid Sunday alias
            return text.parse::<u32>().map_err(|_| self.syntax());
        };
        if column == Column::DayOfWeek && pos == BoundPos::Upper && value == 0 {
            return Ok(7);
        }
        Ok(value)
    }

    fn check_bounds(&self, column: Column, lo: u32, hi: u32) -> Result<(), PatternError> {
        let (min, max) = column.limits();
        if lo < min || hi > max || hi < lo {
            return Err(self.range());
        }
        Ok(())
    }

    fn now_value(&self, column: Column) -> u32 {
        match column {
            Column::Seconds => self.now.second(),
            Column::Minutes => self.now.minute(),
            Column::Hours => self.now.hour(),
            Column::DayOfMonth => self.now.day(),
            Column::Month => self.now.month(),
            Column::DayOfWeek => self.now.weekday().num_days_from_sunday(),
        }
    }

    fn syntax(&self) -> PatternError {
        PatternError::Syntax(self.pattern.to_string())
    }

    fn range(&self) -> PatternError {
        PatternError::Range(self.pattern.to_string())
    }
}

fn name_value(column: Column, text: &str) -> Option<u32> {
    match column {
        Column::Month => MONTH_NAMES
            .iter()
            .position(|n| text.eq_ignore_ascii_case(n))
            .map(|i| i as u32 + 1),
        Column::DayOfWeek => DAY_NAMES
            .iter()
            .position(|n| text.eq_ignore_ascii_case(n))
            .map(|i| i as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn parse(pattern: &str) -> Result<ParsedFields, PatternError> {
        let mut rng = StdRng::seed_from_u64(7);
        parse_pattern(pattern, at(2000, 1, 1, 12, 30, 15), &mut rng)
    }

    #[test]
    fn five_columns_prepend_zero_seconds() {
        let f = parse("* * * * *").unwrap();
        assert_eq!(f.seconds.values(), &[0]);
        assert!(f.seconds.restricted());
        assert!(!f.minutes.restricted());
    }

    #[test]
    fn six_columns_parse_all_fields() {
        let f = parse("5 */10 0-6 1,15 * 1-5").unwrap();
        assert_eq!(f.seconds.values(), &[5]);
        assert_eq!(f.minutes.values(), &[0, 10, 20, 30, 40, 50]);
        assert_eq!(f.hours.values(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(f.days.values(), &[1, 15]);
        assert_eq!(f.weekdays.values(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn wrong_column_count_is_syntax_error() {
        assert_eq!(
            parse("* * * *"),
            Err(PatternError::Syntax("* * * *".into()))
        );
        assert!(matches!(
            parse("* * * * * * *"),
            Err(PatternError::Syntax(_))
        ));
    }

    #[test]
    fn nicknames_expand_case_insensitively() {
        let f = parse("@hourly").unwrap();
        assert_eq!(f.seconds.values(), &[0]);
        assert_eq!(f.minutes.values(), &[0]);
        assert!(!f.hours.restricted());
        assert!(!f.days.restricted());
        assert!(!f.months.restricted());
        assert!(!f.weekdays.restricted());

        let f = parse("@YEARLY").unwrap();
        assert_eq!(f.days.values(), &[1]);
        assert_eq!(f.months.values(), &[0]);

        // Nicknames only match the whole string
        assert!(parse("@hourly *").is_err());
    }

    #[test]
    fn weekly_runs_on_sunday() {
        let f = parse("@weekly").unwrap();
        assert_eq!(f.weekdays.values(), &[0]);
        assert!(f.weekdays.restricted());
    }

    #[test]
    fn months_are_rewritten_zero_based() {
        let f = parse("* * * jan,dec *").unwrap();
        assert_eq!(f.months.values(), &[0, 11]);
    }

    #[test]
    fn weekday_names_and_seven_fold_to_sunday() {
        let f = parse("* * * * sun,sat").unwrap();
        assert_eq!(f.weekdays.values(), &[0, 6]);

        let f = parse("* * * * 7").unwrap();
        assert_eq!(f.weekdays.values(), &[0]);

        // 6-sun runs Saturday through Sunday without wrapping
        let f = parse("* * * * 6-sun").unwrap();
        assert_eq!(f.weekdays.values(), &[0, 6]);
    }

    #[test]
    fn question_mark_captures_now() {
        let f = parse("? ? * * * *").unwrap();
        assert_eq!(f.seconds.values(), &[15]);
        assert_eq!(f.minutes.values(), &[30]);

        // Sunday "now" as an upper day-of-week bound becomes 7, so 6-? is
        // Saturday through Sunday instead of an inverted range.
        let mut rng = StdRng::seed_from_u64(7);
        let sunday = at(2000, 1, 2, 0, 0, 0);
        let f = parse_pattern("* * * * 6-?", sunday, &mut rng).unwrap();
        assert_eq!(f.weekdays.values(), &[0, 6]);
    }

    #[test]
    fn random_subfield_draws_one_value_in_span() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let f = parse_pattern("~ * * * * *", at(2000, 1, 1, 0, 0, 0), &mut rng).unwrap();
            assert_eq!(f.seconds.values().len(), 1);
            assert!(f.seconds.max() <= 59);
            assert!(f.seconds.restricted());
        }
    }

    #[test]
    fn bounded_random_respects_bounds() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let f = parse_pattern("* 10~20 * * * *", at(2000, 1, 1, 0, 0, 0), &mut rng).unwrap();
            let v = f.minutes.values()[0];
            assert_eq!(f.minutes.values().len(), 1);
            assert!((10..=20).contains(&v));
        }
    }

    #[test]
    fn random_with_step_keeps_stepped_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = parse_pattern("* ~/15 * * * *", at(2000, 1, 1, 0, 0, 0), &mut rng).unwrap();
        let values = f.minutes.values();
        assert!(!values.is_empty());
        for pair in values.windows(2) {
            assert_eq!(pair[1] - pair[0], 15);
        }
    }

    #[test]
    fn random_draws_are_fixed_at_parse_time() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let now = at(2000, 1, 1, 0, 0, 0);
        let fa = parse_pattern("~ ~ * * * *", now, &mut a).unwrap();
        let fb = parse_pattern("~ ~ * * * *", now, &mut b).unwrap();
        assert_eq!(fa.seconds.values(), fb.seconds.values());
        assert_eq!(fa.minutes.values(), fb.minutes.values());
    }

    #[test]
    fn out_of_range_values_are_range_errors() {
        assert_eq!(
            parse("60 * * * * *"),
            Err(PatternError::Range("60 * * * * *".into()))
        );
        assert!(matches!(parse("* 24 * * *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("* * 0 * *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("* * 32 * *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("* * * 13 *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("* * * * 8"), Err(PatternError::Range(_))));
    }

    #[test]
    fn inverted_range_and_zero_step_are_range_errors() {
        assert!(matches!(parse("30-10 * * * *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("*/0 * * * *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("1-20/0 * * * *"), Err(PatternError::Range(_))));
    }

    #[test]
    fn malformed_tokens_are_syntax_errors() {
        assert!(matches!(parse("x * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("1- * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("-5 * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("5/2 * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("*/ * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("1,,2 * * * *"), Err(PatternError::Syntax(_))));
        assert!(matches!(parse("jan * * * *"), Err(PatternError::Syntax(_))));
    }

    #[test]
    fn errors_carry_the_verbatim_input() {
        // Not the nickname-substituted or normalized text
        let original = "  @weekly  extra";
        match parse(original) {
            Err(PatternError::Syntax(p)) => assert_eq!(p, original),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn day_of_month_must_fit_longest_allowed_month() {
        assert!(matches!(parse("* * 31 feb *"), Err(PatternError::Range(_))));
        assert!(matches!(parse("* * 30 2 *"), Err(PatternError::Range(_))));
        // February can hold a 29th in leap years
        assert!(parse("* * 29 feb *").is_ok());
        // A longer allowed month rescues the day
        assert!(parse("* * 31 feb,mar *").is_ok());
        // Unconstrained day-of-month always passes
        assert!(parse("* * * feb *").is_ok());
    }

    #[test]
    fn parsing_is_idempotent_for_deterministic_patterns() {
        let a = parse("0 */5 9-17 1,15 jan-jun mon-fri").unwrap();
        let b = parse("0 */5 9-17 1,15 jan-jun mon-fri").unwrap();
        assert_eq!(a.seconds, b.seconds);
        assert_eq!(a.minutes, b.minutes);
        assert_eq!(a.hours, b.hours);
        assert_eq!(a.days, b.days);
        assert_eq!(a.months, b.months);
        assert_eq!(a.weekdays, b.weekdays);
    }
}
