//! Notifier that logs instead of sending.

use crate::traits::{DeliveryReceipt, Notifier, NotifyError, OutboundSms};

#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

impl DryRunNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, sms: &OutboundSms) -> Result<DeliveryReceipt, NotifyError> {
        tracing::info!(
            to = %sms.to,
            from = %sms.from,
            body = %sms.body,
            "dry run: SMS not sent"
        );
        Ok(DeliveryReceipt {
            message_id: "dry-run".to_string(),
            status: None,
        })
    }

    fn channel_name(&self) -> &str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let sms = OutboundSms {
            from: "+15550000000".into(),
            to: "+15551234567".into(),
            body: "hello".into(),
        };
        let receipt = DryRunNotifier::new().send(&sms).await.unwrap();
        assert_eq!(receipt.message_id, "dry-run");
    }

    #[test]
    fn channel_name_is_dry_run() {
        assert_eq!(DryRunNotifier.channel_name(), "dry-run");
    }
}
