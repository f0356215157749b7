use super::{arm_reminder::ArmReminderUseCase, subscribers::NotifyOperatorsOnResponse};
use crate::error::NudgeError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::respond_to_reminder::*;
use nudge_domain::{next_reminders, Reminder, ReminderType, TransitionError, Trigger, UserChoice};
use nudge_infra::NudgeContext;

pub async fn respond_to_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = RespondToReminderUseCase {
        receiver_id: path_params.receiver_id,
        reminder_type: body.reminder_type,
        choice: body.choice,
    };

    execute(usecase, &ctx)
        .await
        .map(|response| HttpResponse::Ok().json(APIResponse::new(response.armed)))
        .map_err(NudgeError::from)
}

/// The receiver picked one of the choices of a reminder
#[derive(Debug)]
pub struct RespondToReminderUseCase {
    pub receiver_id: i64,
    /// `None` when the caller no longer knows which reminder was answered
    pub reminder_type: Option<ReminderType>,
    pub choice: UserChoice,
}

#[derive(Debug)]
pub struct ReminderResponse {
    pub receiver_id: i64,
    pub answered: ReminderType,
    pub choice: UserChoice,
    pub armed: Vec<Reminder>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidTransition(TransitionError),
    StorageError,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidTransition(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RespondToReminderUseCase {
    type Response = ReminderResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "RespondToReminder";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let trigger = Trigger::Response(self.reminder_type, self.choice);
        let next = next_reminders(trigger, &ctx.config.reminder_intervals)
            .map_err(UseCaseError::InvalidTransition)?;
        let answered = self
            .reminder_type
            .ok_or(UseCaseError::InvalidTransition(TransitionError::MissingReminderType))?;

        let mut armed = Vec::with_capacity(next.len());
        for next in next {
            let usecase = ArmReminderUseCase::new(self.receiver_id, next);
            let reminder = execute(usecase, ctx)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            armed.push(reminder);
        }

        Ok(ReminderResponse {
            receiver_id: self.receiver_id,
            answered,
            choice: self.choice,
            armed,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyOperatorsOnResponse)]
    }
}
