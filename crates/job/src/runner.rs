//! Job runner: fan out over users, evaluate, deliver, count.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use nudge_core::User;
use nudge_notify::{Notifier, OutboundSms};
use nudge_rules::{classify_in_zone, compute_window, evaluate, NotifyReason, Verdict};
use nudge_storage::{HabitStore, StorageError};

/// Why a single user could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserFailure {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("delivery error: {0}")]
    Delivery(String),
}

/// Result of processing one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Notified(NotifyReason),
    Skipped,
    Failed(UserFailure),
}

/// Per-run counters. Every listed user lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobResult {
    pub notified: u64,
    pub skipped: u64,
    pub errored: u64,
}

impl JobResult {
    pub fn record(&mut self, outcome: &UserOutcome) {
        match outcome {
            UserOutcome::Notified(_) => self.notified += 1,
            UserOutcome::Skipped => self.skipped += 1,
            UserOutcome::Failed(_) => self.errored += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.notified + self.skipped + self.errored
    }

    /// `0` for a clean run, `1` when any user errored.
    pub fn exit_code(&self) -> u8 {
        if self.errored == 0 {
            0
        } else {
            1
        }
    }
}

impl FromIterator<UserOutcome> for JobResult {
    fn from_iter<I: IntoIterator<Item = UserOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut acc, outcome| {
            acc.record(&outcome);
            acc
        })
    }
}

/// Evaluates every user with a phone number and sends at most one reminder
/// each.
pub struct JobRunner {
    store: Arc<dyn HabitStore>,
    notifier: Arc<dyn Notifier>,
    from_number: String,
    body: String,
    concurrency: usize,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn HabitStore>,
        notifier: Arc<dyn Notifier>,
        from_number: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            from_number: from_number.into(),
            body: body.into(),
            concurrency: 1,
        }
    }

    /// Number of users processed at once. Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run once against the clock reading `now`.
    ///
    /// Only a failure to list users aborts the run; everything after that is
    /// isolated per user and counted in [`JobResult::errored`].
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobResult, StorageError> {
        let span = info_span!("job_run", run_id = %Uuid::new_v4());
        async move {
            info!(
                %now,
                store = self.store.backend_name(),
                channel = self.notifier.channel_name(),
                concurrency = self.concurrency,
                "reminder run started"
            );

            let users = self.store.list_users_with_phone().await?;
            info!(users = users.len(), "users loaded");

            let result = stream::iter(users)
                .map(|user| async move {
                    let span = info_span!("user", user_id = user.id);
                    self.process_user(&user, now).instrument(span).await
                })
                .buffer_unordered(self.concurrency)
                .fold(JobResult::default(), |mut acc, outcome| async move {
                    acc.record(&outcome);
                    acc
                })
                .await;

            info!(
                notified = result.notified,
                skipped = result.skipped,
                errored = result.errored,
                "reminder run finished"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Evaluate one user and deliver a reminder if the verdict says so.
    pub async fn process_user(&self, user: &User, now: DateTime<Utc>) -> UserOutcome {
        // Fallback to UTC is logged by the resolver inside this user's span.
        let (zone, window) = compute_window(&user.timezone, now);

        let logs = match self
            .store
            .list_log_instants(user.id, window.window_start, window.today_start)
            .await
        {
            Ok(logs) => logs,
            Err(e) => {
                error!(user_id = user.id, error = %e, "failed to fetch logs");
                return UserOutcome::Failed(UserFailure::Storage(e.to_string()));
            }
        };

        let activity = classify_in_zone(&logs, zone.zone());
        let reason = match evaluate(&activity, window.local_yesterday) {
            Verdict::Skip => {
                debug!(user_id = user.id, logs = logs.len(), "active yesterday, skipping");
                return UserOutcome::Skipped;
            }
            Verdict::Notify(reason) => reason,
        };

        let sms = OutboundSms {
            from: self.from_number.clone(),
            to: user.phone_number.clone(),
            body: self.body.clone(),
        };
        match self.notifier.send(&sms).await {
            Ok(receipt) => {
                info!(
                    user_id = user.id,
                    %reason,
                    message_id = %receipt.message_id,
                    "reminder sent"
                );
                UserOutcome::Notified(reason)
            }
            Err(e) => {
                error!(user_id = user.id, %reason, error = %e, "failed to send reminder");
                UserOutcome::Failed(UserFailure::Delivery(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_buckets_each_outcome() {
        let result: JobResult = vec![
            UserOutcome::Notified(NotifyReason::NoLogsTwoDays),
            UserOutcome::Notified(NotifyReason::MissedYesterday),
            UserOutcome::Skipped,
            UserOutcome::Failed(UserFailure::Delivery("boom".into())),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            result,
            JobResult {
                notified: 2,
                skipped: 1,
                errored: 1
            }
        );
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn exit_code_reflects_errors() {
        assert_eq!(JobResult::default().exit_code(), 0);
        let failed = JobResult {
            errored: 1,
            ..Default::default()
        };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn result_serializes_counters() {
        let json = serde_json::to_value(JobResult {
            notified: 3,
            skipped: 2,
            errored: 0,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"notified": 3, "skipped": 2, "errored": 0})
        );
    }
}
