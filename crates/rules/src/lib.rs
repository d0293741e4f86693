//! Reminder eligibility, evaluated in each user's local calendar.
//!
//! This crate provides:
//! - Timezone resolution with an explicit UTC fallback
//! - Window calculator turning local day boundaries into UTC instants
//! - Log classifier projecting UTC instants onto local dates
//! - The two-day decision table producing a [`Verdict`]

pub mod classify;
pub mod verdict;
pub mod window;
pub mod zone;

pub use classify::{classify_in_zone, classify_logs, local_date, ActivityDates};
pub use verdict::{evaluate, NotifyReason, Verdict};
pub use window::{compute_window, start_of_local_day, EligibilityWindow};
pub use zone::ZoneResolution;
