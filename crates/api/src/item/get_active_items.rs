use crate::error::MypaError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use mypa_reminders_api_structs::get_active_items::*;
use mypa_reminders_domain::{OwnerId, ScheduleItem};
use mypa_reminders_infra::ReminderContext;

fn handle_error(e: UseCaseError) -> MypaError {
    match e {
        UseCaseError::StorageError => MypaError::InternalError,
    }
}

/// Live schedule for the polling devices of the caller
pub async fn get_active_items_controller(
    http_req: HttpRequest,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, MypaError> {
    let owner_id = protect_route(&http_req, &ctx)?;

    let usecase = GetActiveItemsUseCase { owner_id };

    execute(usecase, &ctx)
        .await
        .map(|items| HttpResponse::Ok().json(APIResponse::new(items)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetActiveItemsUseCase {
    pub owner_id: OwnerId,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetActiveItemsUseCase {
    type Response = Vec<ScheduleItem>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetActiveItems";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .schedule_items
            .find_active(Some(&self.owner_id))
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
