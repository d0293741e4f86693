//! Storage collaborator used by the job runner.

use chrono::{DateTime, Utc};
use nudge_core::{LogInstant, User, UserId};

use crate::error::StorageError;

/// Read-only access to users and their habit logs.
///
/// Implementations hold a connection pool; each call checks a connection
/// out for the duration of one query only.
#[async_trait::async_trait]
pub trait HabitStore: Send + Sync {
    /// All users with a non-empty phone number.
    async fn list_users_with_phone(&self) -> Result<Vec<User>, StorageError>;

    /// Log instants for every habit of `user_id` in `[from, to)`.
    async fn list_log_instants(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LogInstant>, StorageError>;

    /// Human-readable backend name (e.g. "mysql").
    fn backend_name(&self) -> &str;
}
