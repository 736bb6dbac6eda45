use super::IDeviceEndpointRepo;
use crate::repos::shared::inmemory_repo::*;
use mypa_reminders_domain::{DeviceEndpoint, OwnerId, ID};
use std::sync::Mutex;

pub struct InMemoryDeviceEndpointRepo {
    endpoints: Mutex<Vec<DeviceEndpoint>>,
}

impl InMemoryDeviceEndpointRepo {
    pub fn new() -> Self {
        Self {
            endpoints: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDeviceEndpointRepo for InMemoryDeviceEndpointRepo {
    async fn upsert(&self, endpoint: &DeviceEndpoint) -> anyhow::Result<DeviceEndpoint> {
        let existing = find_by(&self.endpoints, |e| e.endpoint == endpoint.endpoint);
        match existing.into_iter().next() {
            Some(mut stored) => {
                stored.refresh_from(endpoint);
                save(&stored, &self.endpoints);
                Ok(stored)
            }
            None => {
                insert(endpoint, &self.endpoints);
                Ok(endpoint.clone())
            }
        }
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> anyhow::Result<Vec<DeviceEndpoint>> {
        Ok(find_by(&self.endpoints, |e| e.owner_id == *owner_id))
    }

    async fn delete(&self, endpoint_id: &ID) -> Option<DeviceEndpoint> {
        delete(endpoint_id, &self.endpoints)
    }

    async fn delete_by_endpoint(&self, owner_id: &OwnerId, endpoint: &str) -> Option<DeviceEndpoint> {
        find_and_delete_by(&self.endpoints, |e| {
            e.owner_id == *owner_id && e.endpoint == endpoint
        })
        .into_iter()
        .next()
    }
}
