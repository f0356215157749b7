use nudge_domain::{date::millis_to_epoch_secs, Reminder, ReminderType, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: String,
    pub job_id: ID,
    pub receiver_id: i64,
    pub reminder_type: ReminderType,
    /// Epoch seconds
    pub remind_at: f64,
    /// Epoch seconds
    pub created_at: f64,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            job_id: reminder.job_id,
            receiver_id: reminder.receiver_id,
            reminder_type: reminder.reminder_type,
            remind_at: millis_to_epoch_secs(reminder.remind_at),
            created_at: millis_to_epoch_secs(reminder.created_at),
        }
    }
}
