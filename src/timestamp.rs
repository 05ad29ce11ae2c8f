//! Nanosecond-precision ordered instant with wall-clock projection.
//!
//! Grounded on `original_source/src/meatpy/timestamp.py`: a thin wrapper
//! around a calendar instant, formatted with microsecond truncation, with
//! construction from a calendar date plus a nanosecond-of-day offset (the
//! piece the source's minimal `Timestamp` doesn't show directly but that
//! every ITCH processor call site relies on).

use std::fmt;
use std::time::Duration;

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// An instant with nanosecond resolution, anchored to a trading date.
///
/// Internally stored as nanoseconds elapsed since `date`'s midnight plus the
/// date itself, which is sufficient for this crate's purposes (a processor
/// only ever operates within a single `book_date`) and keeps the type
/// `Copy` and free of a timezone database dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Timestamp {
    /// Days since the common era epoch (matches `chrono`'s proleptic Gregorian numbering;
    /// we don't depend on `chrono` directly to keep this a zero-dependency leaf type).
    date_days: i32,
    /// Nanoseconds since that date's midnight. May exceed one day's worth
    /// transiently during ITCH 4.1 seconds-marker projection arithmetic,
    /// but is normalized back into `[0, NANOS_PER_DAY)` with `date_days` carried.
    nanos_of_day: i64,
}

impl Timestamp {
    /// Construct from a date (days since CE epoch, proleptic Gregorian) and
    /// a nanosecond offset within that date. The offset may exceed one day;
    /// it is normalized and the excess carried into `date_days`.
    pub fn from_date_and_nanos(date_days: i32, nanos_of_day: i64) -> Timestamp {
        let carry_days = nanos_of_day.div_euclid(NANOS_PER_DAY);
        let normalized = nanos_of_day.rem_euclid(NANOS_PER_DAY);
        Timestamp {
            date_days: date_days + carry_days as i32,
            nanos_of_day: normalized,
        }
    }

    /// Days since the CE epoch this timestamp falls on.
    pub fn date_days(&self) -> i32 {
        self.date_days
    }

    /// Nanoseconds elapsed since that date's midnight.
    pub fn nanos_of_day(&self) -> i64 {
        self.nanos_of_day
    }

    /// Signed duration between two timestamps (`self - other`), in nanoseconds.
    pub fn diff_nanos(&self, other: &Timestamp) -> i64 {
        let days = (self.date_days - other.date_days) as i64;
        days * NANOS_PER_DAY + (self.nanos_of_day - other.nanos_of_day)
    }

    /// `self - other` as a [`Duration`] magnitude plus sign; convenience over
    /// [`Timestamp::diff_nanos`] for callers that want a `std::time::Duration`.
    pub fn saturating_duration_since(&self, other: &Timestamp) -> Duration {
        let d = self.diff_nanos(other);
        Duration::from_nanos(d.max(0) as u64)
    }
}

fn civil_from_days(z: i32) -> (i32, u32, u32) {
    // Howard Hinnant's civil_from_days algorithm (proleptic Gregorian).
    let z = z as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}

impl fmt::Display for Timestamp {
    /// Stringifies as `YYYY-MM-DD HH:MM:SS.uuuuuu` (microsecond-truncated).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d) = civil_from_days(self.date_days);
        let total_us = self.nanos_of_day / 1_000;
        let us = total_us % 1_000_000;
        let total_s = total_us / 1_000_000;
        let s = total_s % 60;
        let total_min = total_s / 60;
        let min = total_min % 60;
        let h = total_min / 60;
        write!(
            f,
            "{y:04}-{m:02}-{d:02} {h:02}:{min:02}:{s:02}.{us:06}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        // 2024-01-15, 12:30:00.123456
        let nanos = ((12 * 3600 + 30 * 60) * 1_000_000_000) + 123_456_000;
        // date_days for 2024-01-15 relative to 1970-01-01 is 19737; we don't
        // depend on that constant being right here, only on round-tripping
        // via from_date_and_nanos + civil_from_days being self-consistent.
        let ts = Timestamp::from_date_and_nanos(19737, nanos);
        let s = ts.to_string();
        assert!(s.ends_with("12:30:00.123456"), "got {s}");
    }

    #[test]
    fn ordering_and_diff() {
        let a = Timestamp::from_date_and_nanos(100, 1_000);
        let b = Timestamp::from_date_and_nanos(100, 2_000);
        assert!(a < b);
        assert_eq!(b.diff_nanos(&a), 1_000);
        assert_eq!(a.diff_nanos(&b), -1_000);
    }

    #[test]
    fn nanos_of_day_overflow_carries_into_date() {
        let a = Timestamp::from_date_and_nanos(100, NANOS_PER_DAY + 5_000);
        assert_eq!(a.date_days(), 101);
        assert_eq!(a.nanos_of_day(), 5_000);
    }

    #[test]
    fn itch41_boundary_example() {
        // After a seconds marker T=3600, inner timestamp 500_000_000 projects
        // to book_date + 1h + 0.5s.
        let book_date = 19737;
        let seconds_marker: i64 = 3600;
        let inner_ts: i64 = 500_000_000;
        let ts = Timestamp::from_date_and_nanos(
            book_date,
            seconds_marker * 1_000_000_000 + inner_ts,
        );
        assert_eq!(ts.nanos_of_day(), 3600 * 1_000_000_000 + 500_000_000);
        assert_eq!(ts.date_days(), book_date);
    }
}
