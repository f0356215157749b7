use super::arm_reminder::ArmReminderUseCase;
use crate::error::NudgeError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::enable_reminders::*;
use nudge_domain::{next_reminders, Reminder, TransitionError, Trigger};
use nudge_infra::NudgeContext;

pub async fn enable_reminders_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;

    let usecase = EnableRemindersUseCase {
        receiver_id: path_params.receiver_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Created().json(APIResponse::new(reminders)))
        .map_err(NudgeError::from)
}

/// Initial opt-in of a receiver, arms both cadences
#[derive(Debug)]
pub struct EnableRemindersUseCase {
    pub receiver_id: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    AlreadyEnabled(i64),
    InvalidTransition(TransitionError),
    StorageError,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::AlreadyEnabled(receiver_id) => Self::Conflict(format!(
                "The receiver with id: {}, already has reminders enabled.",
                receiver_id
            )),
            UseCaseError::InvalidTransition(_) | UseCaseError::StorageError => {
                Self::InternalError
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for EnableRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "EnableReminders";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let existing = ctx
            .repos
            .reminders
            .find_by_receiver(self.receiver_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if !existing.is_empty() {
            return Err(UseCaseError::AlreadyEnabled(self.receiver_id));
        }

        let next = next_reminders(Trigger::OptIn, &ctx.config.reminder_intervals)
            .map_err(UseCaseError::InvalidTransition)?;
        let mut reminders = Vec::with_capacity(next.len());
        for next in next {
            let usecase = ArmReminderUseCase::new(self.receiver_id, next);
            let reminder = execute(usecase, ctx)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            reminders.push(reminder);
        }

        Ok(reminders)
    }
}
