mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
use mypa_reminders_domain::{SchedulerPhase, TickReport};
pub use repos::{IDeviceEndpointRepo, IScheduleItemRepo, Repos};
pub use services::*;
use std::sync::{Arc, RwLock};
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::warn;

/// What the scheduler job is doing, shared with the health endpoint
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    pub phase: SchedulerPhase,
    pub last_tick: Option<TickReport>,
}

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushTransport>,
    pub scheduler_status: Arc<RwLock<SchedulerStatus>>,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl ReminderContext {
    async fn create(params: ContextParams) -> Self {
        let repos = match params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(&connection_string)
                .await
                .expect("Postgres credentials must be valid"),
            None => {
                warn!("No DATABASE_URL given, schedule items and devices are only kept in memory");
                Repos::create_inmemory()
            }
        };
        let config = Config::new();
        let push = Arc::new(HttpPushTransport::new(config.push_timeout_millis));
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            push,
            scheduler_status: Default::default(),
        }
    }

    pub fn create_inmemory() -> Self {
        let config = Config::new();
        let push = Arc::new(HttpPushTransport::new(config.push_timeout_millis));
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys: Arc::new(RealSys {}),
            push,
            scheduler_status: Default::default(),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> ReminderContext {
    ReminderContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING).ok()
}
