use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A user eligible for reminders, as read from storage at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// IANA zone name. May be empty or unknown; resolution falls back to UTC.
    pub timezone: String,
    pub phone_number: String,
}

impl User {
    pub fn new(id: UserId, timezone: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            timezone: timezone.into(),
            phone_number: phone_number.into(),
        }
    }
}

/// One habit-completion event, always a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogInstant(DateTime<Utc>);

impl LogInstant {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Wrap a zone-less timestamp. Storage writes `created_at` in UTC, so a
    /// value without a marker is read as UTC and never as server-local time.
    pub fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Self(naive.and_utc())
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for LogInstant {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl std::fmt::Display for LogInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let instant = LogInstant::from_naive_utc(naive);
        assert_eq!(
            instant.at(),
            Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap()
        );
    }

    #[test]
    fn instants_order_chronologically() {
        let a = LogInstant::new(Utc.with_ymd_and_hms(2024, 3, 9, 1, 0, 0).unwrap());
        let b = LogInstant::new(Utc.with_ymd_and_hms(2024, 3, 9, 2, 0, 0).unwrap());
        assert!(a < b);
        assert_eq!(a.to_string(), "2024-03-09T01:00:00+00:00");
    }
}
