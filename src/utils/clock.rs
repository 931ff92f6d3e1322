use chrono::{DateTime, Local, NaiveDate, Utc};

/// Represents an entity responsible for providing dates across the application. This can allow it
/// to be used for testing.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// The device-local calendar date. Day records are keyed by this, not by UTC.
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
