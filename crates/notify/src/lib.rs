//! SMS delivery for habit reminders.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable delivery channels
//! - Twilio REST implementation
//! - Dry-run implementation that only logs

pub mod dry_run;
pub mod traits;
pub mod twilio;

pub use dry_run::DryRunNotifier;
pub use traits::{DeliveryReceipt, Notifier, NotifyError, OutboundSms};
pub use twilio::TwilioNotifier;
