use super::{DeliveryOutcome, IDeliveryChannel};
use crate::config::WebhookSettings;
use nudge_domain::{InteractiveChoice, ReminderMessage, ReminderType};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Header carrying the shared secret so that the receiving end can verify the sender
pub const WEBHOOK_KEY_HEADER: &str = "nudge-webhook-key";
/// Present in the body of a `403` when the receiver blocked the transport
pub const RECIPIENT_BLOCKED_MARKER: &str = "recipient_blocked";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum WebhookPayload<'a> {
    Reminder(ReminderDelivery<'a>),
    OperatorNotice { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderDelivery<'a> {
    receiver_id: i64,
    reminder_type: ReminderType,
    text: &'a str,
    choices: &'a [InteractiveChoice],
}

/// Delivers by POSTing JSON to the webhook of the messaging transport
pub struct WebhookDeliveryChannel {
    client: Client,
    settings: WebhookSettings,
}

impl WebhookDeliveryChannel {
    pub fn new(settings: WebhookSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&self.settings.url)
            .header(WEBHOOK_KEY_HEADER, &self.settings.key)
            .json(payload)
            .send()
            .await
    }
}

/// Only an explicit signal from the transport counts as a receiver that is gone
/// for good. Anything else, a `404` from a misconfigured url included, is a failure
/// of this single delivery.
fn outcome_from_response(status: StatusCode, body: &str) -> DeliveryOutcome {
    match status {
        s if s.is_success() => DeliveryOutcome::Delivered,
        StatusCode::GONE => {
            DeliveryOutcome::RecipientUnreachable(format!("Delivery webhook responded {}", status))
        }
        StatusCode::FORBIDDEN if body.contains(RECIPIENT_BLOCKED_MARKER) => {
            DeliveryOutcome::RecipientUnreachable("Receiver blocked the transport".into())
        }
        _ => DeliveryOutcome::Failed(format!("Delivery webhook responded {}", status)),
    }
}

#[async_trait::async_trait]
impl IDeliveryChannel for WebhookDeliveryChannel {
    async fn send(&self, receiver_id: i64, message: &ReminderMessage) -> DeliveryOutcome {
        let payload = WebhookPayload::Reminder(ReminderDelivery {
            receiver_id,
            reminder_type: message.reminder_type,
            text: &message.text,
            choices: &message.choices,
        });
        let res = match self.post(&payload).await {
            Ok(res) => res,
            Err(e) => {
                return DeliveryOutcome::Failed(format!("Delivery webhook unreachable: {}", e))
            }
        };
        let status = res.status();
        // An unreadable body is treated like an empty one
        let body = res.text().await.unwrap_or_default();
        outcome_from_response(status, &body)
    }

    async fn notify_operators(&self, text: &str) -> anyhow::Result<()> {
        let status = self
            .post(&WebhookPayload::OperatorNotice { text })
            .await?
            .status();
        if !status.is_success() {
            anyhow::bail!("Delivery webhook responded {} to operator notice", status);
        }
        Ok(())
    }
}
