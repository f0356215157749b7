use crate::error::NudgeError;
use crate::reminder::cancel_reminder;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::cancel_all_reminders::*;
use nudge_domain::Reminder;
use nudge_infra::NudgeContext;
use tracing::warn;

/// Called by the surrounding system when it deleted a team on its own
pub async fn cancel_all_reminders_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;

    let usecase = CancelAllRemindersUseCase {
        receiver_id: path_params.receiver_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(|_| NudgeError::InternalError)
}

/// Cancels every outstanding reminder of the receiver together with its job
#[derive(Debug)]
pub struct CancelAllRemindersUseCase {
    pub receiver_id: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelAllRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelAllReminders";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let reminders = ctx
            .repos
            .reminders
            .find_by_receiver(self.receiver_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        for reminder in &reminders {
            cancel_reminder(reminder, ctx)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        // Jobs of the receiver that lost their reminder record
        let orphans = ctx
            .scheduler
            .get_jobs()
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .into_iter()
            .filter(|job| job.payload.receiver_id() == self.receiver_id);
        for job in orphans {
            warn!(
                "Removing job {} of receiver {} without a reminder",
                job.id, self.receiver_id
            );
            ctx.scheduler
                .remove_job(&job.id)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        Ok(reminders)
    }
}
