mod device_endpoint;
mod schedule_item;
mod shared;

use device_endpoint::{InMemoryDeviceEndpointRepo, PostgresDeviceEndpointRepo};
pub use device_endpoint::IDeviceEndpointRepo;
use schedule_item::{InMemoryScheduleItemRepo, PostgresScheduleItemRepo};
pub use schedule_item::IScheduleItemRepo;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub schedule_items: Arc<dyn IScheduleItemRepo>,
    pub device_endpoints: Arc<dyn IDeviceEndpointRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB EXECUTING MIGRATION ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB EXECUTING MIGRATION ... [done]");

        Ok(Self {
            schedule_items: Arc::new(PostgresScheduleItemRepo::new(pool.clone())),
            device_endpoints: Arc::new(PostgresDeviceEndpointRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            schedule_items: Arc::new(InMemoryScheduleItemRepo::new()),
            device_endpoints: Arc::new(InMemoryDeviceEndpointRepo::new()),
        }
    }
}
