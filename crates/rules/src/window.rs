//! Local-day boundaries expressed as UTC instants.
//!
//! Each boundary is computed from its own calendar date, so the offset used
//! is the one in force on that date. Days of 23 or 25 hours (and the rarer
//! half-hour or two-hour shifts) come out right without any fixed day
//! length.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::zone::ZoneResolution;

/// Granularity used to find the first valid local time after a gap. Every
/// transition in the IANA database falls on a quarter hour.
const GAP_STEP_MINUTES: i64 = 15;

/// Two days of quarter-hour steps; enough to step over a skipped calendar
/// day (Pacific/Apia, 2011-12-30).
const GAP_MAX_STEPS: i64 = 2 * 24 * 60 / GAP_STEP_MINUTES;

/// UTC boundaries of the day before yesterday, yesterday and today, all in
/// one user's local calendar.
///
/// Logs are queried over `[window_start, today_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilityWindow {
    /// Start of the local day two days before today.
    pub window_start: DateTime<Utc>,
    /// Start of local yesterday.
    pub yesterday_start: DateTime<Utc>,
    /// Start of local today; exclusive end of the query range.
    pub today_start: DateTime<Utc>,
    pub local_yesterday: NaiveDate,
}

impl EligibilityWindow {
    /// Compute the window for `now` in an already resolved zone.
    pub fn in_zone(tz: Tz, now: DateTime<Utc>) -> Self {
        let local_today = now.with_timezone(&tz).date_naive();
        let local_yesterday = local_today - Days::new(1);
        let local_day_before = local_today - Days::new(2);

        Self {
            window_start: start_of_local_day(tz, local_day_before),
            yesterday_start: start_of_local_day(tz, local_yesterday),
            today_start: start_of_local_day(tz, local_today),
            local_yesterday,
        }
    }

    pub fn local_day_before(&self) -> NaiveDate {
        self.local_yesterday - Days::new(1)
    }

    pub fn local_today(&self) -> NaiveDate {
        self.local_yesterday + Days::new(1)
    }

    /// Whether `at` falls in `[window_start, today_start)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.window_start <= at && at < self.today_start
    }
}

/// Resolve `timezone` and compute the window for `now`.
///
/// Unknown zones fall back to UTC; the returned [`ZoneResolution`] records
/// which zone was actually used.
pub fn compute_window(timezone: &str, now: DateTime<Utc>) -> (ZoneResolution, EligibilityWindow) {
    let resolution = ZoneResolution::resolve(timezone);
    let window = EligibilityWindow::in_zone(resolution.zone(), now);
    (resolution, window)
}

/// First instant whose local date in `tz` is `date`.
///
/// Normally local midnight. When midnight falls in a gap (clocks jump
/// forward at 00:00) the day starts at the first valid local time after it;
/// when midnight occurs twice the earlier occurrence wins.
pub fn start_of_local_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    for step in 0..=GAP_MAX_STEPS {
        let candidate = midnight + Duration::minutes(step * GAP_STEP_MINUTES);
        if let Some(start) = tz.from_local_datetime(&candidate).earliest() {
            return start.with_timezone(&Utc);
        }
    }

    // Unreachable with real tz data: no gap spans two days.
    midnight.and_utc()
}
