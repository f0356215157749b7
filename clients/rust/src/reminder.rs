use crate::{APIResponse, BaseClient};
use nudge_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get(&self, reminder_id: &str) -> APIResponse<get_reminder::APIResponse> {
        self.base
            .get(format!("reminders/{}", reminder_id), StatusCode::OK)
            .await
    }

    /// Moves the reminder to `remind_at` epoch seconds
    pub async fn reschedule(
        &self,
        reminder_id: &str,
        remind_at: f64,
    ) -> APIResponse<reschedule_reminder::APIResponse> {
        let body = reschedule_reminder::RequestBody { remind_at };
        self.base
            .put(body, format!("reminders/{}", reminder_id), StatusCode::OK)
            .await
    }
}
