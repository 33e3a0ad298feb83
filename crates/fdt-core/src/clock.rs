//! Clock-time resolution for loosely-formatted HHMM strings.
//!
//! Logbook time fields are recorded as bare clock times ("8", "800", "0800",
//! "08:00") with no date or zone attached. This module is the single place
//! where those strings become absolute timestamps: every call site shares the
//! same validation and the same overnight-rollover inference, so rolling
//! window totals stay internally consistent.
//!
//! All resolved timestamps live in one consistent, caller-chosen zone,
//! represented as `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Reasons a raw clock-time string failed to parse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClockParseError {
    /// The string was empty after stripping separators.
    #[error("empty clock time")]
    Empty,

    /// The string contained a character other than a digit or separator.
    #[error("non-digit character in clock time")]
    NonDigit,

    /// More than four digits remained after stripping separators.
    #[error("clock time longer than four digits")]
    TooLong,

    /// Parsed hour was outside 0..=23.
    #[error("hour {0} out of range")]
    HourOutOfRange(u32),

    /// Parsed minute was outside 0..=59.
    #[error("minute {0} out of range")]
    MinuteOutOfRange(u32),
}

/// A validated wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// Anchors this clock time on a calendar date.
    ///
    /// Returns `None` only if the combination is unrepresentable (it never is
    /// for a validated `ClockTime`, but the conversion API is fallible).
    pub fn on(self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        Some(date.and_time(time).and_utc())
    }
}

/// Parses a loose 1-4 digit clock string into hours and minutes.
///
/// Separators (`:`, `.`, whitespace) are stripped first. Interpretation is
/// always hours-then-minutes:
///
/// - 4 digits: `HHMM`
/// - 3 digits: `HMM` (single-digit hour)
/// - 1-2 digits: hour only, minutes zero
pub fn parse_clock_time(raw: &str) -> Result<ClockTime, ClockParseError> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ':' | '.') && !c.is_whitespace())
        .collect();

    if digits.is_empty() {
        return Err(ClockParseError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClockParseError::NonDigit);
    }
    if digits.len() > 4 {
        return Err(ClockParseError::TooLong);
    }

    let (hour, minute) = match digits.len() {
        1 | 2 => (digits.parse::<u32>().map_err(|_| ClockParseError::NonDigit)?, 0),
        3 => (
            digits[..1].parse::<u32>().map_err(|_| ClockParseError::NonDigit)?,
            digits[1..].parse::<u32>().map_err(|_| ClockParseError::NonDigit)?,
        ),
        _ => (
            digits[..2].parse::<u32>().map_err(|_| ClockParseError::NonDigit)?,
            digits[2..].parse::<u32>().map_err(|_| ClockParseError::NonDigit)?,
        ),
    };

    if hour > 23 {
        return Err(ClockParseError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(ClockParseError::MinuteOutOfRange(minute));
    }

    Ok(ClockTime { hour, minute })
}

/// Resolves a raw clock string against a nominal date.
///
/// Returns `None` on any parse failure. Callers must treat `None` as
/// "exclude this leg from this calculation", never as zero.
pub fn resolve(raw: &str, nominal_date: NaiveDate) -> Option<DateTime<Utc>> {
    parse_clock_time(raw).ok()?.on(nominal_date)
}

/// Resolves a leg's `out`/`in` pair against one nominal date, applying the
/// overnight-rollover inference.
///
/// If the out hour is in the afternoon (>= 12) and the in hour is in the
/// morning (< 12), the leg is assumed to have crossed midnight and the `in`
/// date is advanced by one day. This is a heuristic over two time-of-day
/// values with no date context; legs blocking more than 24 hours are
/// misclassified by it.
pub fn resolve_block(
    raw_out: &str,
    raw_in: &str,
    nominal_date: NaiveDate,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let out = parse_clock_time(raw_out).ok()?;
    let block_in = parse_clock_time(raw_in).ok()?;

    let out_ts = out.on(nominal_date)?;
    let in_date = if out.hour >= 12 && block_in.hour < 12 {
        nominal_date.succ_opt()?
    } else {
        nominal_date
    };
    let in_ts = block_in.on(in_date)?;

    Some((out_ts, in_ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_all_digit_widths() {
        assert_eq!(parse_clock_time("8").unwrap(), ClockTime { hour: 8, minute: 0 });
        assert_eq!(parse_clock_time("14").unwrap(), ClockTime { hour: 14, minute: 0 });
        assert_eq!(parse_clock_time("800").unwrap(), ClockTime { hour: 8, minute: 0 });
        assert_eq!(parse_clock_time("945").unwrap(), ClockTime { hour: 9, minute: 45 });
        assert_eq!(parse_clock_time("0800").unwrap(), ClockTime { hour: 8, minute: 0 });
        assert_eq!(parse_clock_time("2359").unwrap(), ClockTime { hour: 23, minute: 59 });
    }

    #[test]
    fn strips_separators() {
        assert_eq!(parse_clock_time("08:00").unwrap(), ClockTime { hour: 8, minute: 0 });
        assert_eq!(parse_clock_time("8.30").unwrap(), ClockTime { hour: 8, minute: 30 });
        assert_eq!(parse_clock_time(" 1445 ").unwrap(), ClockTime { hour: 14, minute: 45 });
    }

    #[test]
    fn left_pad_equivalence() {
        // Any valid input parses the same as its 4-digit left-padded form.
        for raw in ["7", "07", "700", "0700"] {
            assert_eq!(parse_clock_time(raw).unwrap(), ClockTime { hour: 7, minute: 0 });
        }
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(parse_clock_time(""), Err(ClockParseError::Empty));
        assert_eq!(parse_clock_time("  : "), Err(ClockParseError::Empty));
        assert_eq!(parse_clock_time("8a0"), Err(ClockParseError::NonDigit));
        assert_eq!(parse_clock_time("12345"), Err(ClockParseError::TooLong));
        assert_eq!(parse_clock_time("2400"), Err(ClockParseError::HourOutOfRange(24)));
        assert_eq!(parse_clock_time("0860"), Err(ClockParseError::MinuteOutOfRange(60)));
        assert_eq!(parse_clock_time("99"), Err(ClockParseError::HourOutOfRange(99)));
    }

    #[test]
    fn resolve_returns_none_for_garbage() {
        let d = date(2024, 1, 15);
        assert!(resolve("", d).is_none());
        assert!(resolve("x", d).is_none());
        assert!(resolve("2500", d).is_none());
        assert!(resolve("0800", d).is_some());
    }

    #[test]
    fn resolve_anchors_on_nominal_date() {
        let ts = resolve("0830", date(2024, 1, 15)).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn overnight_block_advances_in_date() {
        let (out, block_in) = resolve_block("2330", "0130", date(2024, 1, 15)).unwrap();
        assert_eq!(out.hour(), 23);
        assert_eq!(block_in - out, chrono::Duration::hours(2));
        assert_eq!(block_in.date_naive(), date(2024, 1, 16));
    }

    #[test]
    fn same_day_block_keeps_date() {
        let (out, block_in) = resolve_block("0800", "1145", date(2024, 1, 15)).unwrap();
        assert_eq!(block_in - out, chrono::Duration::minutes(225));
        assert_eq!(block_in.date_naive(), date(2024, 1, 15));
    }

    #[test]
    fn morning_out_morning_in_is_not_overnight() {
        // Out-hour < 12 never triggers rollover even when in < out.
        let (out, block_in) = resolve_block("0900", "0700", date(2024, 1, 15)).unwrap();
        assert!(block_in < out);
    }

    #[test]
    fn block_with_unparsable_endpoint_is_none() {
        let d = date(2024, 1, 15);
        assert!(resolve_block("2330", "", d).is_none());
        assert!(resolve_block("", "0130", d).is_none());
        assert!(resolve_block("2460", "0130", d).is_none());
    }
}
