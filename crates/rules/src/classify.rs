//! Projection of UTC log instants onto local calendar dates.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use nudge_core::LogInstant;

use crate::zone::ZoneResolution;

/// Distinct local dates on which a user logged at least once.
pub type ActivityDates = BTreeSet<NaiveDate>;

/// Local calendar date of `at` in `tz`, using the offset in force at `at`.
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Collapse log instants into the set of local dates they fall on.
pub fn classify_in_zone<'a, I>(logs: I, tz: Tz) -> ActivityDates
where
    I: IntoIterator<Item = &'a LogInstant>,
{
    logs.into_iter().map(|log| local_date(log.at(), tz)).collect()
}

/// Like [`classify_in_zone`], resolving `timezone` first (UTC fallback).
pub fn classify_logs(logs: &[LogInstant], timezone: &str) -> ActivityDates {
    classify_in_zone(logs, ZoneResolution::resolve(timezone).zone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(y: i32, m: u32, d: u32, h: u32, min: u32) -> LogInstant {
        LogInstant::new(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duplicates_collapse_to_one_date() {
        let logs = vec![log(2024, 3, 9, 8, 0), log(2024, 3, 9, 12, 0), log(2024, 3, 9, 23, 59)];
        let dates = classify_logs(&logs, "UTC");
        assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![date(2024, 3, 9)]);
    }

    #[test]
    fn same_instant_lands_on_different_local_dates() {
        // 16:00 UTC on the 9th is already the 10th in Tokyo and still the
        // 9th in Los Angeles.
        let logs = vec![log(2024, 3, 9, 16, 0)];
        assert!(classify_logs(&logs, "Asia/Tokyo").contains(&date(2024, 3, 10)));
        assert!(classify_logs(&logs, "America/Los_Angeles").contains(&date(2024, 3, 9)));
    }

    #[test]
    fn order_of_input_is_irrelevant() {
        let forward = vec![log(2024, 3, 9, 1, 0), log(2024, 3, 10, 1, 0)];
        let backward: Vec<_> = forward.iter().rev().copied().collect();
        assert_eq!(
            classify_logs(&forward, "Europe/Paris"),
            classify_logs(&backward, "Europe/Paris")
        );
    }

    #[test]
    fn offset_is_taken_at_each_instant() {
        // Last EST hour before the 2024-03-10 jump and first EDT hour after.
        let tz = chrono_tz::America::New_York;
        let logs = [log(2024, 3, 10, 6, 30), log(2024, 3, 11, 3, 30)];
        let dates = classify_in_zone(&logs, tz);
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date(2024, 3, 10)]
        );
    }

    #[test]
    fn unknown_zone_classifies_in_utc() {
        let logs = vec![log(2024, 3, 9, 23, 30)];
        assert_eq!(
            classify_logs(&logs, "Nowhere/Special"),
            classify_logs(&logs, "UTC")
        );
    }

    #[test]
    fn no_logs_no_dates() {
        assert!(classify_logs(&[], "Europe/London").is_empty());
    }
}
