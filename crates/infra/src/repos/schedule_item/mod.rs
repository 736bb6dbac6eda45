mod inmemory;
mod postgres;

pub use inmemory::InMemoryScheduleItemRepo;
use mypa_reminders_domain::{ItemRef, OwnerId, ScheduleItem};
pub use postgres::PostgresScheduleItemRepo;

/// The Schedule Store. Alarms, medicines and meetings keyed by owner.
#[async_trait::async_trait]
pub trait IScheduleItemRepo: Send + Sync {
    async fn insert(&self, item: &ScheduleItem) -> anyhow::Result<()>;
    /// `Ok(None)` when there is no such item. Storage failures are errors.
    async fn find(&self, item: &ItemRef) -> anyhow::Result<Option<ScheduleItem>>;
    /// All active items of every kind, optionally limited to one owner
    async fn find_active(&self, owner_id: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>>;
    /// Returns `false` if the item does not exist
    async fn set_active(&self, item: &ItemRef, active: bool) -> anyhow::Result<bool>;
}

#[cfg(test)]
mod tests {
    use crate::ReminderContext;
    use mypa_reminders_domain::{
        AlarmRepeat, ItemKind, ItemRef, ItemTiming, NaiveDate, OwnerId, Presentation,
        ScheduleItem, Weekday,
    };

    fn alarm(id: i64, owner: &str, repeat: AlarmRepeat) -> ScheduleItem {
        ScheduleItem::new(
            id,
            OwnerId::new(owner),
            Presentation::new("Alarm"),
            ItemTiming::Alarm {
                time_of_day: "07:00".parse().unwrap(),
                repeat,
            },
        )
    }

    #[tokio::test]
    async fn finds_active_items_by_owner() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.schedule_items;

        let weekly = alarm(1, "alice", AlarmRepeat::Weekly(vec![Weekday::Mon]));
        let mut inactive = alarm(2, "alice", AlarmRepeat::Daily);
        inactive.active = false;
        let other_owner = alarm(3, "bob", AlarmRepeat::Daily);
        let meeting = ScheduleItem::new(
            1,
            OwnerId::new("alice"),
            Presentation::new("Standup"),
            ItemTiming::Meeting {
                time_of_day: "10:00".parse().unwrap(),
                date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                location: None,
            },
        );
        for item in [&weekly, &inactive, &other_owner, &meeting] {
            repo.insert(item).await.expect("To insert item");
        }

        let all = repo.find_active(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let alice = repo.find_active(Some(&OwnerId::new("alice"))).await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.contains(&weekly));
        assert!(alice.contains(&meeting));
    }

    #[tokio::test]
    async fn set_active_is_scoped_to_kind() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.schedule_items;

        let alarm = alarm(1, "alice", AlarmRepeat::Daily);
        let medicine = ScheduleItem::new(
            1,
            OwnerId::new("alice"),
            Presentation::new("Pill"),
            ItemTiming::Medicine {
                times_of_day: vec!["08:00".parse().unwrap()],
            },
        );
        repo.insert(&alarm).await.unwrap();
        repo.insert(&medicine).await.unwrap();

        assert!(repo.set_active(&alarm.item_ref(), false).await.unwrap());
        assert!(!repo.find(&alarm.item_ref()).await.unwrap().unwrap().active);
        assert!(repo.find(&medicine.item_ref()).await.unwrap().unwrap().active);

        let missing = ItemRef {
            kind: ItemKind::Meeting,
            id: 1,
        };
        assert!(!repo.set_active(&missing, false).await.unwrap());
    }
}
