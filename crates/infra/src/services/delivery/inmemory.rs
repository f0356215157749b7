use super::{DeliveryOutcome, IDeliveryChannel};
use nudge_domain::ReminderMessage;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// Records everything it is asked to deliver. The outcome per receiver
/// can be scripted, `Delivered` otherwise.
pub struct InMemoryDeliveryChannel {
    outcomes: Mutex<HashMap<i64, DeliveryOutcome>>,
    delivered: Mutex<Vec<(i64, ReminderMessage)>>,
    operator_notices: Mutex<Vec<String>>,
}

impl InMemoryDeliveryChannel {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            delivered: Mutex::new(vec![]),
            operator_notices: Mutex::new(vec![]),
        }
    }

    pub fn set_outcome(&self, receiver_id: i64, outcome: DeliveryOutcome) {
        self.outcomes.lock().unwrap().insert(receiver_id, outcome);
    }

    /// Messages that were successfully delivered
    pub fn delivered(&self) -> Vec<(i64, ReminderMessage)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn operator_notices(&self) -> Vec<String> {
        self.operator_notices.lock().unwrap().clone()
    }
}

impl Default for InMemoryDeliveryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IDeliveryChannel for InMemoryDeliveryChannel {
    async fn send(&self, receiver_id: i64, message: &ReminderMessage) -> DeliveryOutcome {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&receiver_id)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered);
        if outcome == DeliveryOutcome::Delivered {
            info!("Delivered {} to {}", message.reminder_type, receiver_id);
            self.delivered
                .lock()
                .unwrap()
                .push((receiver_id, message.clone()));
        }
        outcome
    }

    async fn notify_operators(&self, text: &str) -> anyhow::Result<()> {
        self.operator_notices.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
