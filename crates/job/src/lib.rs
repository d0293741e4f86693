//! Daily habit-reminder job.
//!
//! This crate provides:
//! - `JobRunner`, which evaluates every user and sends reminders
//! - Per-user outcomes folded into a `JobResult`
//! - The `/health` endpoint served while a run is in progress

pub mod health;
pub mod runner;

pub use runner::{JobResult, JobRunner, UserFailure, UserOutcome};
