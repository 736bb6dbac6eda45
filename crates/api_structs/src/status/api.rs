use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;
    use crate::dtos::SchedulerStatusDTO;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        pub scheduler: SchedulerStatusDTO,
    }
}
