/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Maintenance dates (`fm`, `sm`) are calendar days without a time component.
pub type Date = chrono::NaiveDate;

/// The current calendar date in UTC.
///
/// Category derivation and every transition take "today" as an explicit
/// argument; handlers obtain it here once per request.
pub fn today() -> Date {
    chrono::Utc::now().date_naive()
}
