//! Twilio Programmable Messaging notifier.
//!
//! Sends via `POST {base}/2010-04-01/Accounts/{sid}/Messages.json` with a
//! form-encoded `To`/`From`/`Body` payload and HTTP basic auth.

use std::time::Duration;

use nudge_core::config::TwilioConfig;
use serde_json::Value;

use crate::traits::{DeliveryReceipt, Notifier, NotifyError, OutboundSms};

/// Sends text messages through the Twilio REST API.
#[derive(Debug)]
pub struct TwilioNotifier {
    account_sid: String,
    auth_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioNotifier {
    /// Creates a notifier from the loaded Twilio settings.
    ///
    /// Returns [`NotifyError::Config`] when the SID or token is empty, and
    /// [`NotifyError::Http`] when the HTTP client cannot be built.
    pub fn from_config(config: &TwilioConfig) -> Result<Self, NotifyError> {
        if config.account_sid.is_empty() {
            return Err(NotifyError::Config(
                "Twilio account SID must not be empty".to_string(),
            ));
        }
        if config.auth_token.is_empty() {
            return Err(NotifyError::Config(
                "Twilio auth token must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait::async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, sms: &OutboundSms) -> Result<DeliveryReceipt, NotifyError> {
        let form = [
            ("To", sms.to.as_str()),
            ("From", sms.from.as_str()),
            ("Body", sms.body.as_str()),
        ];

        tracing::debug!(to = %sms.to, "sending Twilio SMS");

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            // Error bodies carry `code` and `message`.
            let code = body.get("code").and_then(Value::as_i64);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(text);
            tracing::warn!(to = %sms.to, %status, ?code, "Twilio returned non-2xx status");
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let error_code = body.get("error_code").and_then(Value::as_i64);
        if error_code.is_some() {
            let message = body
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("unknown Twilio error")
                .to_string();
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                code: error_code,
                message,
            });
        }

        let message_id = body
            .get("sid")
            .and_then(Value::as_str)
            .ok_or_else(|| NotifyError::Provider {
                status: status.as_u16(),
                code: None,
                message: "response did not include a message sid".to_string(),
            })?
            .to_string();
        let provider_status = body
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string);

        tracing::info!(to = %sms.to, sid = %message_id, "Twilio SMS accepted");
        Ok(DeliveryReceipt {
            message_id,
            status: provider_status,
        })
    }

    fn channel_name(&self) -> &str {
        "twilio"
    }
}
