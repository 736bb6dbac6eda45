use crate::dtos::DeviceEndpointDTO;
use mypa_reminders_domain::DeviceEndpoint;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEndpointResponse {
    pub device: DeviceEndpointDTO,
}

impl DeviceEndpointResponse {
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self {
            device: DeviceEndpointDTO::new(endpoint),
        }
    }
}

pub mod subscribe_device {
    use super::*;
    use mypa_reminders_domain::{DeviceClass, EndpointKeys, Platform};

    /// The owner is always the authenticated caller, so there is no owner field
    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
        pub keys: EndpointKeys,
        pub platform: Platform,
        pub device_class: DeviceClass,
        #[serde(default)]
        pub supports_full_screen_presentation: bool,
    }

    pub type APIResponse = DeviceEndpointResponse;
}

pub mod unsubscribe_device {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
    }

    pub type APIResponse = DeviceEndpointResponse;
}

pub mod get_devices {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub devices: Vec<DeviceEndpointDTO>,
    }

    impl APIResponse {
        pub fn new(devices: Vec<DeviceEndpoint>) -> Self {
            Self {
                devices: devices.into_iter().map(DeviceEndpointDTO::new).collect(),
            }
        }
    }
}
