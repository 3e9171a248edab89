use time::{Date, OffsetDateTime};
use time_tz::{ToTimezone, timezones};

/// Resolves the calendar date of `now` in the residence's timezone.
/// Unknown zone names fall back to the instant's own offset.
pub fn local_date(tz: &str, now: OffsetDateTime) -> Date {
    let mut now = now;

    if let Some(tz) = timezones::get_by_name(tz) {
        now = now.to_timezone(tz);
    }

    now.date()
}
