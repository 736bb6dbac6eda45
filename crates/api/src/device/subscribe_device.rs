use crate::error::MypaError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use mypa_reminders_api_structs::subscribe_device::*;
use mypa_reminders_domain::{DeviceClass, DeviceEndpoint, EndpointKeys, OwnerId, Platform};
use mypa_reminders_infra::ReminderContext;

fn handle_error(e: UseCaseError) -> MypaError {
    match e {
        UseCaseError::InvalidEndpoint(endpoint) => MypaError::BadClientData(format!(
            "The endpoint: `{}` is not a valid push endpoint url",
            endpoint
        )),
        UseCaseError::StorageError => MypaError::InternalError,
    }
}

pub async fn subscribe_device_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, MypaError> {
    let owner_id = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = SubscribeDeviceUseCase {
        owner_id,
        endpoint: body.endpoint,
        keys: body.keys,
        platform: body.platform,
        device_class: body.device_class,
        supports_full_screen: body.supports_full_screen_presentation,
    };

    execute(usecase, &ctx)
        .await
        .map(|endpoint| HttpResponse::Created().json(APIResponse::new(endpoint)))
        .map_err(handle_error)
}

/// Subscribing again from the same endpoint refreshes the stored metadata
#[derive(Debug)]
struct SubscribeDeviceUseCase {
    pub owner_id: OwnerId,
    pub endpoint: String,
    pub keys: EndpointKeys,
    pub platform: Platform,
    pub device_class: DeviceClass,
    pub supports_full_screen: bool,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidEndpoint(String),
    StorageError,
}

fn is_valid_endpoint(endpoint: &str) -> bool {
    (endpoint.starts_with("https://") || endpoint.starts_with("http://"))
        && !endpoint.contains(char::is_whitespace)
}

#[async_trait::async_trait(?Send)]
impl UseCase for SubscribeDeviceUseCase {
    type Response = DeviceEndpoint;

    type Error = UseCaseError;

    const NAME: &'static str = "SubscribeDevice";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        if !is_valid_endpoint(&self.endpoint) {
            return Err(UseCaseError::InvalidEndpoint(self.endpoint.clone()));
        }

        let endpoint = DeviceEndpoint::new(
            self.owner_id.clone(),
            self.endpoint.clone(),
            self.keys.clone(),
            self.platform,
            self.device_class,
            self.supports_full_screen,
            ctx.sys.get_timestamp_millis(),
        );
        ctx.repos
            .device_endpoints
            .upsert(&endpoint)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
