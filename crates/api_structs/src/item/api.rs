use crate::dtos::ScheduleItemDTO;
use mypa_reminders_domain::ScheduleItem;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemResponse {
    pub item: ScheduleItemDTO,
}

impl ScheduleItemResponse {
    pub fn new(item: ScheduleItem) -> Self {
        Self {
            item: ScheduleItemDTO::new(item),
        }
    }
}

pub mod get_active_items {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub items: Vec<ScheduleItemDTO>,
    }

    impl APIResponse {
        pub fn new(items: Vec<ScheduleItem>) -> Self {
            Self {
                items: items.into_iter().map(ScheduleItemDTO::new).collect(),
            }
        }
    }
}

pub mod deactivate_item {
    use super::*;
    use mypa_reminders_domain::ItemKind;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PathParams {
        pub kind: ItemKind,
        pub item_id: i64,
    }

    pub type APIResponse = ScheduleItemResponse;
}
