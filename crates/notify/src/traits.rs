//! Notifier trait definition and shared error types.

/// Errors that can occur during message delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but refused the message.
    #[error("provider rejected message (HTTP {status}, code {code:?}): {message}")]
    Provider {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A single text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutboundSms {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id (`SM...` for Twilio).
    pub message_id: String,
    /// Provider status at acceptance time, e.g. `queued`.
    pub status: Option<String>,
}

/// Trait for delivery channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. No retries are attempted.
    async fn send(&self, sms: &OutboundSms) -> Result<DeliveryReceipt, NotifyError>;

    /// Human-readable name for this channel (e.g., "twilio", "dry-run").
    fn channel_name(&self) -> &str;
}
