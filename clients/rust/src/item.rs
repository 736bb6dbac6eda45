use crate::{APIResponse, BaseClient};
use mypa_reminders_api_structs::*;
use mypa_reminders_domain::{ItemRef, ScheduleItem};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ItemClient {
    base: Arc<BaseClient>,
}

impl ItemClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Active alarms, medicines and meetings of the authenticated owner
    pub async fn get_active(&self) -> APIResponse<Vec<ScheduleItem>> {
        self.base
            .get::<get_active_items::APIResponse>("items/active".into(), StatusCode::OK)
            .await
            .map(|res| res.items.into_iter().map(ScheduleItem::from).collect())
    }

    pub async fn deactivate(&self, item: &ItemRef) -> APIResponse<deactivate_item::APIResponse> {
        self.base
            .put(
                format!("items/{}/{}/deactivate", item.kind, item.id),
                StatusCode::OK,
            )
            .await
    }
}
