use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across the application. This can allow it
/// to be used for testing
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;

    /// Today's calendar date in the local zone. Document keys are derived from this, the time of
    /// day is discarded.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
