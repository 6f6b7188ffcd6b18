use chrono::NaiveDate;

/// This is the standard way of converting a date to a document key in dayscore.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
