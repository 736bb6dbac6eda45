mod base;
mod device;
mod item;
pub mod runtime;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use device::DeviceClient;
pub use device::SubscribeDeviceInput;
use item::ItemClient;
pub use mypa_reminders_api_structs::dtos::*;
pub use mypa_reminders_domain::{
    DeviceClass, EndpointKeys, ItemKind, ItemRef, OccurrenceKey, Platform, ScheduleItem, Tz,
};
use status::StatusClient;
use std::sync::Arc;

/// MyPA reminders SDK
///
/// Clients for the server API. Every request is made on behalf of
/// the owner of the identity token.
#[derive(Clone)]
pub struct MypaSDK {
    pub device: DeviceClient,
    pub item: ItemClient,
    pub status: StatusClient,
}

impl MypaSDK {
    pub fn new<T: Into<String>>(address: String, token: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_token(token.into());
        let base = Arc::new(base);
        let device = DeviceClient::new(base.clone());
        let item = ItemClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            device,
            item,
            status,
        }
    }
}
