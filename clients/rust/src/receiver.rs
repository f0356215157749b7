use crate::{APIResponse, BaseClient};
use nudge_api_structs::*;
use nudge_domain::{ReminderType, UserChoice};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReceiverClient {
    base: Arc<BaseClient>,
}

pub struct RespondInput {
    pub receiver_id: i64,
    pub reminder_type: Option<ReminderType>,
    pub choice: UserChoice,
}

impl ReceiverClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn enable_reminders(
        &self,
        receiver_id: i64,
    ) -> APIResponse<enable_reminders::APIResponse> {
        self.base
            .post(
                (),
                format!("receivers/{}/reminders", receiver_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get_reminders(
        &self,
        receiver_id: i64,
    ) -> APIResponse<get_receiver_reminders::APIResponse> {
        self.base
            .get(
                format!("receivers/{}/reminders", receiver_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn cancel_all_reminders(
        &self,
        receiver_id: i64,
    ) -> APIResponse<cancel_all_reminders::APIResponse> {
        self.base
            .delete(
                format!("receivers/{}/reminders", receiver_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn respond(&self, input: RespondInput) -> APIResponse<respond_to_reminder::APIResponse> {
        let body = respond_to_reminder::RequestBody {
            reminder_type: input.reminder_type,
            choice: input.choice,
        };
        self.base
            .post(
                body,
                format!("receivers/{}/responses", input.receiver_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn rearm(
        &self,
        receiver_id: i64,
        reminder_type: ReminderType,
    ) -> APIResponse<rearm_reminder::APIResponse> {
        self.base
            .post(
                (),
                format!(
                    "receivers/{}/reminders/{}/rearm",
                    receiver_id,
                    reminder_type.as_str()
                ),
                StatusCode::CREATED,
            )
            .await
    }
}
