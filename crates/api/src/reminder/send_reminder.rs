use crate::shared::{
    operators::notify_operators,
    usecase::{execute, UseCase},
};
use crate::team::teardown_team::TeardownTeamUseCase;
use nudge_domain::{SendReminderPayload, ID};
use nudge_infra::{DeliveryOutcome, NudgeContext};
use tracing::{error, info};

/// Delivers a reminder whose job fired
#[derive(Debug)]
pub struct SendReminderUseCase {
    pub job_id: ID,
    pub payload: SendReminderPayload,
}

#[derive(Debug, PartialEq)]
pub enum DeliveryReport {
    /// The reminder was canceled before its job fired
    Skipped,
    Delivered,
    /// The receiver is gone, and so is its team
    TeamTornDown,
    /// Dropped, operators have to re-trigger it
    Failed(String),
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendReminderUseCase {
    type Response = DeliveryReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendReminder";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let payload = &self.payload;
        let reminder = match ctx
            .repos
            .reminders
            .find(&payload.reminder_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
        {
            Some(reminder) if reminder.job_id == self.job_id => reminder,
            _ => {
                info!(
                    "Reminder {} is gone, nothing to deliver for job {}",
                    payload.reminder_id, self.job_id
                );
                return Ok(DeliveryReport::Skipped);
            }
        };

        // Removed before sending so that this occurrence can never be scheduled twice
        if ctx
            .repos
            .reminders
            .delete(&reminder.id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .is_none()
        {
            return Ok(DeliveryReport::Skipped);
        }

        match ctx.channel.send(reminder.receiver_id, &payload.message()).await {
            DeliveryOutcome::Delivered => Ok(DeliveryReport::Delivered),
            DeliveryOutcome::RecipientUnreachable(reason) => {
                let teardown = TeardownTeamUseCase {
                    receiver_id: reminder.receiver_id,
                    reason: format!("recipient unreachable: {}", reason),
                };
                execute(teardown, ctx)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                Ok(DeliveryReport::TeamTornDown)
            }
            DeliveryOutcome::Failed(reason) => {
                error!(
                    "Delivery of reminder {} to {} failed: {}",
                    reminder.id, reminder.receiver_id, reason
                );
                let text = format!(
                    "The {} reminder {} could not be delivered to receiver {}: {}. \
                     It will not be retried, re-arm it if needed.",
                    reminder.reminder_type.describe(),
                    reminder.id,
                    reminder.receiver_id,
                    reason
                );
                notify_operators(&text, ctx).await;
                Ok(DeliveryReport::Failed(reason))
            }
        }
    }
}
