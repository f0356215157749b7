use crate::error::NudgeError;
use crate::shared::{
    auth::protect_route,
    guard::Guard,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::reschedule_reminder::*;
use nudge_domain::{
    date::{epoch_secs_to_millis, millis_to_datetime},
    Reminder,
};
use nudge_infra::NudgeContext;

pub async fn reschedule_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;
    let remind_at = Guard::against_malformed_epoch_secs(body.remind_at)?;

    let usecase = RescheduleReminderUseCase {
        reminder_id: path_params.into_inner().reminder_id,
        remind_at: epoch_secs_to_millis(remind_at),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(NudgeError::from)
}

/// Admin manual reschedule of an outstanding reminder
#[derive(Debug)]
pub struct RescheduleReminderUseCase {
    pub reminder_id: String,
    /// Timestamp in millis
    pub remind_at: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(String),
    InvalidRemindAt(i64),
    StorageError,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found. It might already have been sent.",
                reminder_id
            )),
            UseCaseError::InvalidRemindAt(remind_at) => Self::BadClientData(format!(
                "The timestamp {} is out of range",
                remind_at
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RescheduleReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "RescheduleReminder";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let run_date =
            millis_to_datetime(self.remind_at).ok_or(UseCaseError::InvalidRemindAt(self.remind_at))?;

        let reminder = match ctx.repos.reminders.find(&self.reminder_id).await {
            Ok(Some(reminder)) => reminder,
            Ok(None) => return Err(UseCaseError::NotFound(self.reminder_id.clone())),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        // Moving the job decides whether the reminder still fires
        let job = ctx
            .scheduler
            .reschedule_job(&reminder.job_id, run_date)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if job.is_none() {
            return Err(UseCaseError::NotFound(self.reminder_id.clone()));
        }

        match ctx
            .repos
            .reminders
            .update_remind_at(&self.reminder_id, self.remind_at)
            .await
        {
            Ok(Some(reminder)) => Ok(reminder),
            Ok(None) => Err(UseCaseError::NotFound(self.reminder_id.clone())),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}
