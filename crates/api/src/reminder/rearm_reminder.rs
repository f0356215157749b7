use super::arm_reminder::ArmReminderUseCase;
use crate::error::NudgeError;
use crate::shared::{
    auth::protect_route,
    guard::Guard,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::rearm_reminder::*;
use nudge_domain::{next_reminders, Reminder, ReminderType, TransitionError, Trigger};
use nudge_infra::NudgeContext;

pub async fn rearm_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;
    let reminder_type = Guard::against_malformed_reminder_type(&path_params.reminder_type)?;

    let usecase = RearmReminderUseCase {
        receiver_id: path_params.receiver_id,
        reminder_type,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Created().json(APIResponse::new(reminder)))
        .map_err(NudgeError::from)
}

/// Operator re-trigger of a reminder, e.g. after a delivery failed
#[derive(Debug)]
pub struct RearmReminderUseCase {
    pub receiver_id: i64,
    pub reminder_type: ReminderType,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidTransition(TransitionError),
    StorageError,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidTransition(_) | UseCaseError::StorageError => {
                Self::InternalError
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RearmReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "RearmReminder";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let next = next_reminders(
            Trigger::Rearm(self.reminder_type),
            &ctx.config.reminder_intervals,
        )
        .map_err(UseCaseError::InvalidTransition)?;

        let mut armed = Vec::with_capacity(next.len());
        for next in next {
            let usecase = ArmReminderUseCase::new(self.receiver_id, next);
            let reminder = execute(usecase, ctx)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            armed.push(reminder);
        }

        armed.pop().ok_or(UseCaseError::StorageError)
    }
}
