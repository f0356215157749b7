use super::respond_to_reminder::{ReminderResponse, RespondToReminderUseCase};
use crate::shared::{operators::notify_operators, usecase::Subscriber};
use nudge_infra::NudgeContext;

/// Operators follow what every receiver decided
pub struct NotifyOperatorsOnResponse;

#[async_trait::async_trait(?Send)]
impl Subscriber<RespondToReminderUseCase> for NotifyOperatorsOnResponse {
    async fn notify(&self, e: &ReminderResponse, ctx: &NudgeContext) {
        let next = e
            .armed
            .iter()
            .map(|reminder| format!("{} reminder {}", reminder.reminder_type.describe(), reminder.id))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "Receiver {} answered the {} reminder with `{}`. Armed next: {}",
            e.receiver_id,
            e.answered.describe(),
            e.choice,
            next
        );
        notify_operators(&text, ctx).await;
    }
}
