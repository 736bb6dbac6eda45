use super::{
    offline_cache::OfflineCache,
    presentation::{present, AlarmSurface, PresentationHandle},
    DeviceConfig,
};
use mypa_reminders_api_structs::dtos::DueEventDTO;
use mypa_reminders_domain::{
    Due, DueEvent, DismissalRecord, ItemRef, LocalMoment, NaiveDate, OccurrenceKey, Presentation,
    ScheduleItem, TimeOfDay,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What the coordinator needs to know about an occurrence to present it,
/// whichever path it arrived on
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerNotice {
    pub item: ItemRef,
    pub occurrence_key: OccurrenceKey,
    pub one_shot: bool,
    pub presentation: Presentation,
    /// `false` when the endpoint only shows a plain notification
    pub full_screen: bool,
}

impl TriggerNotice {
    pub fn new(item: &ScheduleItem, due: &Due) -> Self {
        let event = DueEvent::new(item, due);
        Self {
            item: event.item,
            occurrence_key: event.occurrence_key,
            one_shot: event.one_shot,
            presentation: event.presentation,
            full_screen: true,
        }
    }
}

impl From<&DueEventDTO> for TriggerNotice {
    fn from(event: &DueEventDTO) -> Self {
        Self {
            item: event.item_ref(),
            occurrence_key: event.occurrence_key.clone(),
            one_shot: event.one_shot,
            presentation: event.presentation(),
            full_screen: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Poll,
    Push,
    Deferred,
    Snooze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Presented,
    /// The same occurrence was triggered within the dedup window
    Duplicate,
    /// The user already dismissed this occurrence today
    Suppressed,
    /// The occurrence was presented earlier in this minute or is snoozed
    AlreadyActive,
}

struct ActiveOccurrence {
    notice: TriggerNotice,
    handle: PresentationHandle,
    started_at: i64,
    /// Local minute the occurrence was triggered in
    minute: Option<(NaiveDate, TimeOfDay)>,
}

struct Snoozed {
    notice: TriggerNotice,
    until: i64,
}

/// Decides which due occurrences are presented on this device.
///
/// Poll, push and deferred triggers all pass through `trigger`, which
/// owns the dedup window, the same day dismissal check and the set of
/// occurrences currently presented or snoozed.
///
/// An occurrence key names the same alarm time every day, so an
/// occurrence only counts as active within the minute it was triggered
/// in. A modal the user left open is retired when the key comes due again.
pub struct TriggerCoordinator {
    config: DeviceConfig,
    surface: Box<dyn AlarmSurface>,
    cache: OfflineCache,
    items: Vec<ScheduleItem>,
    dedup: HashMap<OccurrenceKey, i64>,
    active: HashMap<OccurrenceKey, ActiveOccurrence>,
    snoozed: HashMap<OccurrenceKey, Snoozed>,
}

impl TriggerCoordinator {
    pub fn new(config: DeviceConfig, surface: Box<dyn AlarmSurface>, cache: OfflineCache) -> Self {
        Self {
            config,
            surface,
            cache,
            items: Vec::new(),
            dedup: HashMap::new(),
            active: HashMap::new(),
            snoozed: HashMap::new(),
        }
    }

    fn local(&self, now: i64) -> Option<LocalMoment> {
        LocalMoment::at(now, &self.config.timezone)
    }

    /// Uses freshly fetched items and mirrors them for offline use
    pub fn load_live(&mut self, items: Vec<ScheduleItem>) {
        if let Err(e) = self.cache.mirror_all(items.clone()) {
            warn!("Unable to mirror schedule into the offline cache: {}", e);
        }
        self.items = items;
    }

    /// Falls back to the last mirrored items
    pub fn load_offline(&mut self) {
        self.items = self.cache.readback_all();
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut OfflineCache {
        &mut self.cache
    }

    fn minute(&self, now: i64) -> Option<(NaiveDate, TimeOfDay)> {
        self.local(now).map(|moment| (moment.date, moment.time))
    }

    /// The modal or notification is still up, waiting for the user
    pub fn is_presenting(&self, key: &OccurrenceKey) -> bool {
        self.active.contains_key(key)
    }

    /// Presented during the local minute of `now`
    pub fn is_active(&self, key: &OccurrenceKey, now: i64) -> bool {
        let minute = self.minute(now);
        self.active
            .get(key)
            .map(|occurrence| minute.is_some() && occurrence.minute == minute)
            .unwrap_or(false)
    }

    pub fn is_snoozed(&self, key: &OccurrenceKey) -> bool {
        self.snoozed.contains_key(key)
    }

    pub fn trigger(&mut self, notice: TriggerNotice, source: TriggerSource, now: i64) -> TriggerOutcome {
        let key = notice.occurrence_key.clone();

        if let Some(seen) = self.dedup.get(&key) {
            if now - seen < self.config.dedup_window_millis {
                debug!("Dropping {:?} trigger for {}: duplicate", source, key);
                return TriggerOutcome::Duplicate;
            }
        }
        if let Some(moment) = self.local(now) {
            if self.cache.is_dismissed(&key, &moment.date) {
                debug!("Dropping {:?} trigger for {}: dismissed today", source, key);
                return TriggerOutcome::Suppressed;
            }
        }
        if self.snoozed.contains_key(&key) || self.is_active(&key, now) {
            return TriggerOutcome::AlreadyActive;
        }
        if self.take(&key).is_some() {
            info!("Retiring unanswered presentation of {}", key);
        }

        info!("Presenting {} from {:?}", key, source);
        self.dedup.insert(key.clone(), now);
        let handle = present(
            self.surface.as_mut(),
            &key,
            &notice.presentation,
            self.config.snooze_minutes,
            notice.full_screen,
        );
        let minute = self.minute(now);
        self.active.insert(
            key,
            ActiveOccurrence {
                notice,
                handle,
                started_at: now,
                minute,
            },
        );
        TriggerOutcome::Presented
    }

    /// One pass of the poll loop. Returns the occurrences presented by it.
    pub fn tick(&mut self, now: i64) -> Vec<OccurrenceKey> {
        let window = self.config.dedup_window_millis;
        self.dedup.retain(|_, seen| now - *seen < window);

        for occurrence in self.active.values_mut() {
            let duration = i64::from(occurrence.notice.presentation.duration_seconds) * 1000;
            if occurrence.handle.is_playing_audio() && now - occurrence.started_at >= duration {
                // The modal and vibration stay until the user acts
                occurrence.handle.stop_audio();
            }
        }

        let mut presented = Vec::new();

        let due_snoozes = self
            .snoozed
            .iter()
            .filter(|(_, snoozed)| snoozed.until <= now)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in due_snoozes {
            if let Some(snoozed) = self.snoozed.remove(&key) {
                if self.trigger(snoozed.notice, TriggerSource::Snooze, now) == TriggerOutcome::Presented {
                    presented.push(key);
                }
            }
        }

        let moment = match self.local(now) {
            Some(moment) => moment,
            None => return presented,
        };
        let mut notices = Vec::new();
        for item in self.items.iter().filter(|item| item.active) {
            match item.is_due(&moment) {
                Ok(Some(due)) => notices.push(TriggerNotice::new(item, &due)),
                Ok(None) => (),
                Err(e) => warn!("Skipping item {}: {}", item.item_ref(), e),
            }
        }
        for notice in notices {
            let key = notice.occurrence_key.clone();
            if self.trigger(notice, TriggerSource::Poll, now) == TriggerOutcome::Presented {
                presented.push(key);
            }
        }

        presented
    }

    fn take(&mut self, key: &OccurrenceKey) -> Option<TriggerNotice> {
        if let Some(mut occurrence) = self.active.remove(key) {
            occurrence.handle.cancel();
            if occurrence.notice.full_screen {
                self.surface.close_modal(key);
            } else {
                self.surface.close_notification(key);
            }
            return Some(occurrence.notice);
        }
        self.snoozed.remove(key).map(|snoozed| snoozed.notice)
    }

    /// Stops the occurrence and records that the user acted on it.
    ///
    /// Returns the item to deactivate in the schedule store when the
    /// occurrence was one shot. Dismissing twice does nothing the second time.
    pub fn dismiss(&mut self, key: &OccurrenceKey, now: i64) -> Option<ItemRef> {
        let notice = self.take(key)?;
        let moment = self.local(now)?;

        let record = DismissalRecord {
            occurrence_key: key.clone(),
            dismissed_at: moment.time,
            date: moment.date,
        };
        if let Err(e) = self.cache.record_dismissal(record) {
            warn!("Unable to record dismissal of {}: {}", key, e);
        }

        if !notice.one_shot {
            return None;
        }
        for item in self.items.iter_mut().filter(|i| i.item_ref() == notice.item) {
            item.active = false;
        }
        if let Err(e) = self.cache.deactivate_item(&notice.item) {
            warn!("Unable to deactivate {} in the offline cache: {}", notice.item, e);
        }
        Some(notice.item)
    }

    /// Stops the occurrence and presents it again after `minutes`
    pub fn snooze(&mut self, key: &OccurrenceKey, minutes: u32, now: i64) -> bool {
        let notice = match self.take(key) {
            Some(notice) => notice,
            None => return false,
        };
        self.dedup.remove(key);
        let until = now + i64::from(minutes) * 60 * 1000;
        info!("Snoozed {} for {} minutes", key, minutes);
        self.snoozed.insert(key.clone(), Snoozed { notice, until });
        true
    }

    pub fn purge_dismissals(&mut self, today: &NaiveDate) -> usize {
        match self.cache.purge_older_than(today) {
            Ok(purged) => purged,
            Err(e) => {
                warn!("Unable to purge old dismissals: {}", e);
                0
            }
        }
    }
}
