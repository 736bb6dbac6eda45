use super::IScheduleItemRepo;
use crate::repos::shared::inmemory_repo::*;
use mypa_reminders_domain::{ItemRef, OwnerId, ScheduleItem};

pub struct InMemoryScheduleItemRepo {
    items: std::sync::Mutex<Vec<ScheduleItem>>,
}

impl InMemoryScheduleItemRepo {
    pub fn new() -> Self {
        Self {
            items: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IScheduleItemRepo for InMemoryScheduleItemRepo {
    async fn insert(&self, item: &ScheduleItem) -> anyhow::Result<()> {
        insert(item, &self.items);
        Ok(())
    }

    async fn find(&self, item_ref: &ItemRef) -> anyhow::Result<Option<ScheduleItem>> {
        Ok(find_by(&self.items, |item| item.item_ref() == *item_ref)
            .into_iter()
            .next())
    }

    async fn find_active(&self, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
        Ok(find_by(&self.items, |item| {
            item.active && owner_id.map(|owner| item.owner_id == *owner).unwrap_or(true)
        }))
    }

    async fn set_active(&self, item_ref: &ItemRef, active: bool) -> anyhow::Result<bool> {
        let updated = update_many(
            &self.items,
            |item| item.item_ref() == *item_ref,
            |item| item.active = active,
        );
        Ok(updated > 0)
    }
}
