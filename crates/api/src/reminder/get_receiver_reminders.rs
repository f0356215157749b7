use crate::error::NudgeError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::get_receiver_reminders::*;
use nudge_domain::Reminder;
use nudge_infra::NudgeContext;

pub async fn get_receiver_reminders_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_route(&http_req, &ctx)?;

    let usecase = GetReceiverRemindersUseCase {
        receiver_id: path_params.receiver_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(|_| NudgeError::InternalError)
}

#[derive(Debug)]
pub struct GetReceiverRemindersUseCase {
    pub receiver_id: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReceiverRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReceiverReminders";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .reminders
            .find_by_receiver(self.receiver_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
