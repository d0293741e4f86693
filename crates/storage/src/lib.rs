//! Habit storage for the reminder job.
//!
//! This crate provides:
//! - `HabitStore` trait consumed by the job runner
//! - `MySqlHabitStore`, a sqlx MySQL pool implementation

pub mod error;
pub mod mysql;
pub mod traits;

pub use error::StorageError;
pub use mysql::MySqlHabitStore;
pub use traits::HabitStore;
