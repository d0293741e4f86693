//! The notify/skip decision over the last two local days.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::classify::ActivityDates;

/// Why a reminder is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyReason {
    /// Nothing logged on either of the last two local days.
    NoLogsTwoDays,
    /// Logged the day before yesterday but not yesterday.
    MissedYesterday,
}

impl NotifyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoLogsTwoDays => "no_logs_two_days",
            Self::MissedYesterday => "missed_yesterday",
        }
    }
}

impl std::fmt::Display for NotifyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Notify(NotifyReason),
    Skip,
}

impl Verdict {
    /// Decision table, first match wins:
    ///
    /// | day before | yesterday | verdict                  |
    /// |------------|-----------|--------------------------|
    /// | no         | no        | notify, no_logs_two_days |
    /// | yes        | no        | notify, missed_yesterday |
    /// | any        | yes       | skip                     |
    pub fn decide(has_day_before: bool, has_yesterday: bool) -> Self {
        match (has_day_before, has_yesterday) {
            (false, false) => Self::Notify(NotifyReason::NoLogsTwoDays),
            (true, false) => Self::Notify(NotifyReason::MissedYesterday),
            (_, true) => Self::Skip,
        }
    }

    pub fn reason(&self) -> Option<NotifyReason> {
        match self {
            Self::Notify(reason) => Some(*reason),
            Self::Skip => None,
        }
    }

    pub fn should_notify(&self) -> bool {
        matches!(self, Self::Notify(_))
    }
}

/// Evaluate a user's activity against local yesterday and the day before.
pub fn evaluate(activity: &ActivityDates, local_yesterday: NaiveDate) -> Verdict {
    let local_day_before = local_yesterday - Days::new(1);
    Verdict::decide(
        activity.contains(&local_day_before),
        activity.contains(&local_yesterday),
    )
}
