use super::IDeviceEndpointRepo;
use mypa_reminders_domain::{DeviceEndpoint, EndpointKeys, OwnerId, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresDeviceEndpointRepo {
    pool: PgPool,
}

impl PostgresDeviceEndpointRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeviceEndpointRaw {
    endpoint_uid: Uuid,
    owner_id: String,
    endpoint: String,
    p256dh: String,
    auth: String,
    platform: String,
    device_class: String,
    supports_full_screen: bool,
    created: i64,
    updated: i64,
}

impl TryFrom<DeviceEndpointRaw> for DeviceEndpoint {
    type Error = anyhow::Error;

    fn try_from(raw: DeviceEndpointRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.endpoint_uid.into(),
            owner_id: OwnerId::new(raw.owner_id),
            endpoint: raw.endpoint,
            keys: EndpointKeys {
                p256dh: raw.p256dh,
                auth: raw.auth,
            },
            platform: raw.platform.parse()?,
            device_class: raw.device_class.parse()?,
            supports_full_screen: raw.supports_full_screen,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_endpoints(rows: Vec<DeviceEndpointRaw>) -> Vec<DeviceEndpoint> {
    rows.into_iter()
        .filter_map(|row| match DeviceEndpoint::try_from(row) {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                warn!("Skipping malformed device endpoint row: {:?}", e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl IDeviceEndpointRepo for PostgresDeviceEndpointRepo {
    async fn upsert(&self, endpoint: &DeviceEndpoint) -> anyhow::Result<DeviceEndpoint> {
        let row: DeviceEndpointRaw = sqlx::query_as(
            r#"
            INSERT INTO device_endpoints
            (endpoint_uid, owner_id, endpoint, p256dh, auth, platform, device_class, supports_full_screen, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (endpoint) DO UPDATE SET
                owner_id = EXCLUDED.owner_id,
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth,
                platform = EXCLUDED.platform,
                device_class = EXCLUDED.device_class,
                supports_full_screen = EXCLUDED.supports_full_screen,
                updated = EXCLUDED.updated
            RETURNING *
            "#,
        )
        .bind(endpoint.id.inner_ref())
        .bind(endpoint.owner_id.as_str())
        .bind(&endpoint.endpoint)
        .bind(&endpoint.keys.p256dh)
        .bind(&endpoint.keys.auth)
        .bind(endpoint.platform.as_str())
        .bind(endpoint.device_class.as_str())
        .bind(endpoint.supports_full_screen)
        .bind(endpoint.created)
        .bind(endpoint.updated)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> anyhow::Result<Vec<DeviceEndpoint>> {
        let rows: Vec<DeviceEndpointRaw> = sqlx::query_as(
            r#"
            SELECT * FROM device_endpoints AS d
            WHERE d.owner_id = $1
            ORDER BY d.created
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(into_endpoints(rows))
    }

    async fn delete(&self, endpoint_id: &ID) -> Option<DeviceEndpoint> {
        let row: DeviceEndpointRaw = sqlx::query_as(
            r#"
            DELETE FROM device_endpoints AS d
            WHERE d.endpoint_uid = $1
            RETURNING *
            "#,
        )
        .bind(endpoint_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()??;

        row.try_into().ok()
    }

    async fn delete_by_endpoint(&self, owner_id: &OwnerId, endpoint: &str) -> Option<DeviceEndpoint> {
        let row: DeviceEndpointRaw = sqlx::query_as(
            r#"
            DELETE FROM device_endpoints AS d
            WHERE d.owner_id = $1 AND d.endpoint = $2
            RETURNING *
            "#,
        )
        .bind(owner_id.as_str())
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await
        .ok()??;

        row.try_into().ok()
    }
}
