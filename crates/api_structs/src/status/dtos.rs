use mypa_reminders_domain::{SchedulerPhase, TickReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatusDTO {
    pub phase: SchedulerPhase,
    pub last_tick: Option<TickReport>,
}
