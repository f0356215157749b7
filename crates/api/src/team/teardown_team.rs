use super::cancel_all_reminders::CancelAllRemindersUseCase;
use crate::shared::{
    operators::notify_operators,
    usecase::{execute, UseCase},
};
use nudge_domain::Reminder;
use nudge_infra::NudgeContext;
use tracing::error;

/// Removes a team this server decided has to go, e.g. because its receiver blocked us
#[derive(Debug)]
pub struct TeardownTeamUseCase {
    pub receiver_id: i64,
    pub reason: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for TeardownTeamUseCase {
    /// The reminders that were canceled
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "TeardownTeam";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let canceled = execute(
            CancelAllRemindersUseCase {
                receiver_id: self.receiver_id,
            },
            ctx,
        )
        .await
        .map_err(|_| UseCaseError::StorageError)?;

        if let Err(e) = ctx
            .team_hook
            .on_team_deleted(self.receiver_id, &self.reason)
            .await
        {
            error!(
                "Unable to tell that team {} was deleted: {:?}",
                self.receiver_id, e
            );
        }

        let text = format!(
            "Team {} was deleted, {}. {} outstanding reminders were canceled.",
            self.receiver_id,
            self.reason,
            canceled.len()
        );
        notify_operators(&text, ctx).await;

        Ok(canceled)
    }
}
