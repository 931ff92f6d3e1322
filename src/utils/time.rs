use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use now::DateTimeNow;

/// This is the standard way of converting a date to a namespace key in daylog.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns the last representable instant of the given calendar day in UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .end_of_day()
}
