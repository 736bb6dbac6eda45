use crate::error::MypaError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use mypa_reminders_api_structs::unsubscribe_device::*;
use mypa_reminders_domain::{DeviceEndpoint, OwnerId};
use mypa_reminders_infra::ReminderContext;

fn handle_error(e: UseCaseError) -> MypaError {
    match e {
        UseCaseError::NotFound(endpoint) => MypaError::NotFound(format!(
            "The device endpoint: {}, was not found.",
            endpoint
        )),
    }
}

pub async fn unsubscribe_device_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, MypaError> {
    let owner_id = protect_route(&http_req, &ctx)?;

    let usecase = UnsubscribeDeviceUseCase {
        owner_id,
        endpoint: body.0.endpoint,
    };

    execute(usecase, &ctx)
        .await
        .map(|endpoint| HttpResponse::Ok().json(APIResponse::new(endpoint)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct UnsubscribeDeviceUseCase {
    pub owner_id: OwnerId,
    pub endpoint: String,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for UnsubscribeDeviceUseCase {
    type Response = DeviceEndpoint;

    type Error = UseCaseError;

    const NAME: &'static str = "UnsubscribeDevice";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .device_endpoints
            .delete_by_endpoint(&self.owner_id, &self.endpoint)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.endpoint.clone()))
    }
}
