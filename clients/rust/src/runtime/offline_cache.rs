use super::deferred::DeferredTrigger;
use mypa_reminders_domain::{DismissalRecord, ItemKind, ItemRef, NaiveDate, OccurrenceKey, ScheduleItem};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum OfflineCacheError {
    #[error("Unable to access the offline cache: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to serialize the offline cache: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheContents {
    #[serde(default)]
    items: HashMap<ItemKind, Vec<ScheduleItem>>,
    #[serde(default)]
    dismissals: Vec<DismissalRecord>,
    #[serde(default)]
    pending_trigger: Option<DeferredTrigger>,
}

/// Device local mirror of the schedule and the log of dismissals.
///
/// Backed by a json file, or only by memory when there is no file.
/// Every change is written through.
#[derive(Debug)]
pub struct OfflineCache {
    path: Option<PathBuf>,
    contents: CacheContents,
}

impl OfflineCache {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            contents: Default::default(),
        }
    }

    /// Opens the cache stored at `path`. A missing or unreadable file
    /// gives an empty cache, the cache is only a fallback.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let contents = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Discarding corrupt offline cache at {:?}: {}", path, e);
                CacheContents::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => CacheContents::default(),
            Err(e) => {
                warn!("Unable to read offline cache at {:?}: {}", path, e);
                CacheContents::default()
            }
        };
        Self {
            path: Some(path),
            contents,
        }
    }

    fn persist(&self) -> Result<(), OfflineCacheError> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec(&self.contents)?;
            std::fs::write(path, bytes)?;
        }
        Ok(())
    }

    /// Replaces everything cached for `kind`
    pub fn mirror(&mut self, kind: ItemKind, items: Vec<ScheduleItem>) -> Result<(), OfflineCacheError> {
        let items = items.into_iter().filter(|item| item.kind() == kind).collect();
        self.contents.items.insert(kind, items);
        self.persist()
    }

    /// Replaces every kind with the given live items. A kind without
    /// items is mirrored as empty.
    pub fn mirror_all(&mut self, items: Vec<ScheduleItem>) -> Result<(), OfflineCacheError> {
        let mut by_kind: HashMap<ItemKind, Vec<ScheduleItem>> =
            ItemKind::all().iter().map(|kind| (*kind, Vec::new())).collect();
        for item in items {
            by_kind.entry(item.kind()).or_default().push(item);
        }
        self.contents.items = by_kind;
        self.persist()
    }

    pub fn readback(&self, kind: ItemKind) -> Vec<ScheduleItem> {
        self.contents.items.get(&kind).cloned().unwrap_or_default()
    }

    pub fn readback_all(&self) -> Vec<ScheduleItem> {
        ItemKind::all()
            .iter()
            .flat_map(|kind| self.readback(*kind))
            .collect()
    }

    /// Marks a mirrored item inactive so it is not offered again while offline
    pub fn deactivate_item(&mut self, item: &ItemRef) -> Result<(), OfflineCacheError> {
        if let Some(items) = self.contents.items.get_mut(&item.kind) {
            for cached in items.iter_mut().filter(|cached| cached.id == item.id) {
                cached.active = false;
            }
        }
        self.persist()
    }

    pub fn record_dismissal(&mut self, record: DismissalRecord) -> Result<(), OfflineCacheError> {
        self.contents
            .dismissals
            .retain(|existing| !existing.matches(&record.occurrence_key, &record.date));
        self.contents.dismissals.push(record);
        self.persist()
    }

    pub fn is_dismissed(&self, key: &OccurrenceKey, date: &NaiveDate) -> bool {
        self.contents
            .dismissals
            .iter()
            .any(|record| record.matches(key, date))
    }

    /// Removes dismissals dated before `today`. Returns how many were removed.
    pub fn purge_older_than(&mut self, today: &NaiveDate) -> Result<usize, OfflineCacheError> {
        let before = self.contents.dismissals.len();
        self.contents.dismissals.retain(|record| record.date >= *today);
        let purged = before - self.contents.dismissals.len();
        if purged > 0 {
            self.persist()?;
        }
        Ok(purged)
    }

    pub fn store_pending(&mut self, trigger: DeferredTrigger) -> Result<(), OfflineCacheError> {
        self.contents.pending_trigger = Some(trigger);
        self.persist()
    }

    /// Pending triggers are replayed at most once
    pub fn take_pending(&mut self) -> Result<Option<DeferredTrigger>, OfflineCacheError> {
        let pending = self.contents.pending_trigger.take();
        if pending.is_some() {
            self.persist()?;
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mypa_reminders_domain::{AlarmRepeat, ItemTiming, OwnerId, Presentation, Weekday};

    fn alarm(id: i64) -> ScheduleItem {
        ScheduleItem::new(
            id,
            OwnerId::new("alice"),
            Presentation::new("Alarm"),
            ItemTiming::Alarm {
                time_of_day: "07:00".parse().unwrap(),
                repeat: AlarmRepeat::Weekly(vec![Weekday::Mon]),
            },
        )
    }

    fn medicine(id: i64) -> ScheduleItem {
        ScheduleItem::new(
            id,
            OwnerId::new("alice"),
            Presentation::new("Pill"),
            ItemTiming::Medicine {
                times_of_day: vec!["08:00".parse().unwrap(), "20:00".parse().unwrap()],
            },
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn dismissal(key: &str, day: u32) -> DismissalRecord {
        DismissalRecord {
            occurrence_key: OccurrenceKey::from(key),
            dismissed_at: "07:00".parse().unwrap(),
            date: date(day),
        }
    }

    #[test]
    fn mirror_replaces_all_items_of_kind() {
        let mut cache = OfflineCache::in_memory();
        cache.mirror(ItemKind::Alarm, vec![alarm(1), alarm(2)]).unwrap();
        cache.mirror(ItemKind::Medicine, vec![medicine(1)]).unwrap();

        cache.mirror(ItemKind::Alarm, vec![alarm(3)]).unwrap();
        assert_eq!(cache.readback(ItemKind::Alarm), vec![alarm(3)]);
        assert_eq!(cache.readback(ItemKind::Medicine), vec![medicine(1)]);
        assert!(cache.readback(ItemKind::Meeting).is_empty());

        cache.mirror_all(vec![medicine(2)]).unwrap();
        assert!(cache.readback(ItemKind::Alarm).is_empty());
        assert_eq!(cache.readback_all(), vec![medicine(2)]);
    }

    #[test]
    fn purge_only_removes_older_dismissals() {
        let mut cache = OfflineCache::in_memory();
        cache.record_dismissal(dismissal("alarm-1-07:00", 18)).unwrap();
        cache.record_dismissal(dismissal("alarm-1-07:00", 19)).unwrap();
        cache.record_dismissal(dismissal("alarm-2-07:00", 20)).unwrap();

        assert_eq!(cache.purge_older_than(&date(19)).unwrap(), 1);
        let key = OccurrenceKey::from("alarm-1-07:00");
        assert!(!cache.is_dismissed(&key, &date(18)));
        assert!(cache.is_dismissed(&key, &date(19)));
        assert!(cache.is_dismissed(&OccurrenceKey::from("alarm-2-07:00"), &date(20)));
    }

    #[test]
    fn deactivated_item_is_kept_inactive() {
        let mut cache = OfflineCache::in_memory();
        cache.mirror_all(vec![alarm(1), alarm(2)]).unwrap();
        cache.deactivate_item(&alarm(1).item_ref()).unwrap();

        let alarms = cache.readback(ItemKind::Alarm);
        assert!(!alarms[0].active);
        assert!(alarms[1].active);
    }

    #[test]
    fn survives_reopening_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = OfflineCache::open(&path);
        cache.mirror_all(vec![alarm(1), medicine(1)]).unwrap();
        cache.record_dismissal(dismissal("alarm-1-07:00", 19)).unwrap();
        drop(cache);

        let mut cache = OfflineCache::open(&path);
        assert_eq!(cache.readback(ItemKind::Alarm), vec![alarm(1)]);
        assert_eq!(cache.readback(ItemKind::Medicine), vec![medicine(1)]);
        assert!(cache.is_dismissed(&OccurrenceKey::from("alarm-1-07:00"), &date(19)));
        assert!(cache.take_pending().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_gives_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{not json").unwrap();

        let cache = OfflineCache::open(&path);
        assert!(cache.readback_all().is_empty());
    }
}
