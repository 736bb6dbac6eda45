use crate::error::MypaError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use mypa_reminders_api_structs::get_devices::*;
use mypa_reminders_domain::{DeviceEndpoint, OwnerId};
use mypa_reminders_infra::ReminderContext;

fn handle_error(e: UseCaseError) -> MypaError {
    match e {
        UseCaseError::StorageError => MypaError::InternalError,
    }
}

pub async fn get_devices_controller(
    http_req: HttpRequest,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, MypaError> {
    let owner_id = protect_route(&http_req, &ctx)?;

    let usecase = GetDevicesUseCase { owner_id };

    execute(usecase, &ctx)
        .await
        .map(|devices| HttpResponse::Ok().json(APIResponse::new(devices)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetDevicesUseCase {
    pub owner_id: OwnerId,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDevicesUseCase {
    type Response = Vec<DeviceEndpoint>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDevices";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .device_endpoints
            .find_by_owner(&self.owner_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
