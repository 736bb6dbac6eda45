mod inmemory;
mod postgres;

pub use inmemory::InMemoryDeviceEndpointRepo;
use mypa_reminders_domain::{DeviceEndpoint, OwnerId, ID};
pub use postgres::PostgresDeviceEndpointRepo;

/// The Device Registry
#[async_trait::async_trait]
pub trait IDeviceEndpointRepo: Send + Sync {
    /// Inserts the endpoint or refreshes the existing row with the same
    /// `endpoint` url. Returns what is stored afterwards.
    async fn upsert(&self, endpoint: &DeviceEndpoint) -> anyhow::Result<DeviceEndpoint>;
    async fn find_by_owner(&self, owner_id: &OwnerId) -> anyhow::Result<Vec<DeviceEndpoint>>;
    async fn delete(&self, endpoint_id: &ID) -> Option<DeviceEndpoint>;
    /// Removes the subscription only if it belongs to `owner_id`
    async fn delete_by_endpoint(&self, owner_id: &OwnerId, endpoint: &str) -> Option<DeviceEndpoint>;
}

#[cfg(test)]
mod tests {
    use crate::ReminderContext;
    use mypa_reminders_domain::{DeviceClass, DeviceEndpoint, EndpointKeys, OwnerId, Platform};

    fn subscription(owner: &str, endpoint: &str, now: i64) -> DeviceEndpoint {
        DeviceEndpoint::new(
            OwnerId::new(owner),
            endpoint.into(),
            EndpointKeys {
                p256dh: "p256dh".into(),
                auth: "auth".into(),
            },
            Platform::Web,
            DeviceClass::Desktop,
            false,
            now,
        )
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_endpoint() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.device_endpoints;

        let first = repo
            .upsert(&subscription("alice", "https://push/1", 10))
            .await
            .expect("To insert endpoint");

        let mut again = subscription("alice", "https://push/1", 20);
        again.platform = Platform::Android;
        again.device_class = DeviceClass::Mobile;
        again.supports_full_screen = true;
        let refreshed = repo.upsert(&again).await.expect("To refresh endpoint");

        assert_eq!(refreshed.id, first.id);
        assert_eq!(refreshed.created, 10);
        assert_eq!(refreshed.updated, 20);
        assert_eq!(refreshed.platform, Platform::Android);

        let stored = repo.find_by_owner(&OwnerId::new("alice")).await.unwrap();
        assert_eq!(stored, vec![refreshed]);
    }

    #[tokio::test]
    async fn delete_by_endpoint_is_scoped_to_owner() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.device_endpoints;

        repo.upsert(&subscription("alice", "https://push/a", 1))
            .await
            .unwrap();
        let bob = repo
            .upsert(&subscription("bob", "https://push/b", 1))
            .await
            .unwrap();

        assert!(repo
            .delete_by_endpoint(&OwnerId::new("alice"), "https://push/b")
            .await
            .is_none());
        assert!(repo
            .delete_by_endpoint(&OwnerId::new("alice"), "https://push/a")
            .await
            .is_some());
        assert!(repo
            .find_by_owner(&OwnerId::new("alice"))
            .await
            .unwrap()
            .is_empty());

        assert_eq!(repo.delete(&bob.id).await, Some(bob.clone()));
        assert!(repo.delete(&bob.id).await.is_none());
    }
}
