//! Timestamp parsing, timezone offsets and commit date interpolation.
//!
//! Everything in here is pure: no git, no terminal. The rewrite plan calls
//! [`interpolate`] once per run and renders each instant with
//! [`format_git_date`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Utc};

use crate::error::RewriteError;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Naive layouts accepted after RFC 3339 fails. Interpreted as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a user-supplied timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2025-01-01T00:00:00Z`, `2025-01-01T05:30:00+05:30`),
/// naive date-times with `T` or a space as separator, and bare dates. Naive
/// values carry no offset and are taken as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, RewriteError> {
    let s = input.trim();

    let rfc_err = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(RewriteError::InvalidTimestamp {
        input: input.to_string(),
        reason: format!("{} (expected ISO 8601, e.g. 2025-01-01T00:00:00)", rfc_err),
    })
}

/// A fixed offset from UTC written as `±HH:MM`.
///
/// Keeps the sign the user typed so `-00:00` renders as `-0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneOffset {
    negative: bool,
    hours: u8,
    minutes: u8,
}

impl TimezoneOffset {
    /// Offset used when `--timezone` is not given (IST).
    pub const DEFAULT: &'static str = "+05:30";

    /// Parses `±HH:MM`. Hours may be 00-14, minutes 00-59.
    pub fn parse(input: &str) -> Result<Self, RewriteError> {
        let invalid = |reason: &str| RewriteError::InvalidTimezone {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (negative, rest) = if let Some(rest) = input.strip_prefix('+') {
            (false, rest)
        } else if let Some(rest) = input.strip_prefix('-') {
            (true, rest)
        } else {
            return Err(invalid("timezone must start with + or -"));
        };

        let Some((hh, mm)) = rest.split_once(':') else {
            return Err(invalid("timezone must include colon separator"));
        };

        let hours = two_digits(hh).ok_or_else(|| invalid("hour must be two digits"))?;
        let minutes = two_digits(mm).ok_or_else(|| invalid("minute must be two digits"))?;

        if hours > 14 {
            return Err(invalid("hour must be between 00 and 14"));
        }
        if minutes > 59 {
            return Err(invalid("minute must be between 00 and 59"));
        }

        Ok(Self {
            negative,
            hours,
            minutes,
        })
    }

    /// Signed offset in seconds east of UTC.
    pub fn seconds(&self) -> i32 {
        let magnitude = i32::from(self.hours) * 3600 + i32::from(self.minutes) * 60;
        if self.negative { -magnitude } else { magnitude }
    }

    /// The `±HHMM` suffix git expects in `GIT_*_DATE`.
    pub fn git_suffix(&self) -> String {
        let sign = if self.negative { '-' } else { '+' };
        format!("{}{:02}{:02}", sign, self.hours, self.minutes)
    }

    fn fixed_offset(&self) -> FixedOffset {
        // Bounded to ±14:59 by `parse`, always representable.
        FixedOffset::east_opt(self.seconds()).unwrap_or(Utc.fix())
    }
}

impl Default for TimezoneOffset {
    fn default() -> Self {
        Self {
            negative: false,
            hours: 5,
            minutes: 30,
        }
    }
}

impl FromStr for TimezoneOffset {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { '-' } else { '+' };
        write!(f, "{}{:02}:{:02}", sign, self.hours, self.minutes)
    }
}

fn two_digits(s: &str) -> Option<u8> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Spreads `n` instants evenly over `[start, end]`, oldest first.
///
/// Commit `i` gets `start + i * (end - start) / (n - 1)`; a single commit
/// gets `start`. The division happens on the whole nanosecond span for each
/// index, so rounding never accumulates and the last instant is `end`.
pub fn interpolate(n: usize, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let span = end - start;
            let total = i128::from(span.num_seconds()) * NANOS_PER_SECOND
                + i128::from(span.subsec_nanos());
            let steps = (n - 1) as i128;

            (0..n)
                .map(|i| {
                    let offset = total * i as i128 / steps;
                    start + nanos_to_delta(offset)
                })
                .collect()
        }
    }
}

fn nanos_to_delta(nanos: i128) -> TimeDelta {
    let secs = nanos.div_euclid(NANOS_PER_SECOND) as i64;
    let sub = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    TimeDelta::new(secs, sub).unwrap_or(TimeDelta::zero())
}

/// Renders `at` as wall-clock time in `tz`, e.g. `2025-01-01 05:30:00 +0530`.
///
/// The instant is unchanged; only the presentation moves into `tz`.
pub fn format_git_date(at: DateTime<Utc>, tz: TimezoneOffset) -> String {
    let local = at.with_timezone(&tz.fixed_offset());
    format!("{} {}", local.format("%Y-%m-%d %H:%M:%S"), tz.git_suffix())
}
