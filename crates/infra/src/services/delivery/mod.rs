mod inmemory;
mod webhook;

pub use inmemory::InMemoryDeliveryChannel;
use nudge_domain::ReminderMessage;
pub use webhook::WebhookDeliveryChannel;

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The receiver can never be reached again through the channel, e.g. it blocked us
    RecipientUnreachable(String),
    /// Transient or unknown failure
    Failed(String),
}

/// The transport that carries reminders to receivers and notices to operators
#[async_trait::async_trait]
pub trait IDeliveryChannel: Send + Sync {
    async fn send(&self, receiver_id: i64, message: &ReminderMessage) -> DeliveryOutcome;
    async fn notify_operators(&self, text: &str) -> anyhow::Result<()>;
}
