use crate::{APIResponse, BaseClient};
use mypa_reminders_api_structs::*;
use mypa_reminders_domain::{DeviceClass, EndpointKeys, Platform};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct DeviceClient {
    base: Arc<BaseClient>,
}

pub struct SubscribeDeviceInput {
    pub endpoint: String,
    pub keys: EndpointKeys,
    pub platform: Platform,
    pub device_class: DeviceClass,
    pub supports_full_screen_presentation: bool,
}

impl DeviceClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn subscribe(
        &self,
        input: SubscribeDeviceInput,
    ) -> APIResponse<subscribe_device::APIResponse> {
        let body = subscribe_device::RequestBody {
            endpoint: input.endpoint,
            keys: input.keys,
            platform: input.platform,
            device_class: input.device_class,
            supports_full_screen_presentation: input.supports_full_screen_presentation,
        };
        self.base
            .post(body, "devices".into(), StatusCode::CREATED)
            .await
    }

    pub async fn unsubscribe(
        &self,
        endpoint: String,
    ) -> APIResponse<unsubscribe_device::APIResponse> {
        let body = unsubscribe_device::RequestBody { endpoint };
        self.base
            .delete(body, "devices".into(), StatusCode::OK)
            .await
    }

    pub async fn list(&self) -> APIResponse<get_devices::APIResponse> {
        self.base.get("devices".into(), StatusCode::OK).await
    }
}
