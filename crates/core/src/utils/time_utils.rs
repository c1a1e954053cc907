use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{Result, ValidationError};

/// Default civil timezone for day boundaries.
/// This is the canonical timezone used to convert UTC instants to calendar days
/// for streaks, daily cooldowns and goal windows.
pub const DEFAULT_CIVIL_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a civil date in the given timezone.
///
/// This is the single source of truth for converting instants to calendar days.
/// Use this whenever you need to derive a "day" from a timestamp.
pub fn civil_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Signed number of civil days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Returns the UTC instant at which `date` begins in `tz`.
///
/// If local midnight does not exist (DST jump at midnight), the day starts at
/// the first valid local instant after it.
pub fn start_of_civil_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => (1..=3)
            .find_map(|hours| {
                tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// Monday 00:00 local of the week containing `now`, as a UTC instant.
pub fn start_of_week(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = civil_date_from_utc(now, tz);
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    start_of_civil_day(monday, tz)
}

/// First day of the month containing `now`, 00:00 local, as a UTC instant.
pub fn start_of_month(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = civil_date_from_utc(now, tz);
    // Day 1 of an existing month always exists.
    let first = today.with_day(1).unwrap_or(today);
    start_of_civil_day(first, tz)
}

/// Parses an IANA timezone name such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(name.to_string()).into())
}
