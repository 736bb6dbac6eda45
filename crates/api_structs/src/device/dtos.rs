use mypa_reminders_domain::{DeviceClass, DeviceEndpoint, Platform, ID};
use serde::{Deserialize, Serialize};

/// A registered endpoint. The encryption keys never leave the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEndpointDTO {
    pub id: ID,
    pub endpoint: String,
    pub platform: Platform,
    pub device_class: DeviceClass,
    pub supports_full_screen_presentation: bool,
    pub created: i64,
    pub updated: i64,
}

impl DeviceEndpointDTO {
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self {
            id: endpoint.id,
            endpoint: endpoint.endpoint,
            platform: endpoint.platform,
            device_class: endpoint.device_class,
            supports_full_screen_presentation: endpoint.supports_full_screen,
            created: endpoint.created,
            updated: endpoint.updated,
        }
    }
}
