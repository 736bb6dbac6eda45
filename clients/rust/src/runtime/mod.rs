//! Per device trigger runtime.
//!
//! Keeps the device's view of the schedule, polls it every second and
//! merges the occurrences it finds with the ones pushed by the server,
//! so that every occurrence is presented once.

pub mod coordinator;
pub mod deferred;
pub mod offline_cache;
pub mod presentation;

use crate::{item::ItemClient, APIResponse};
use async_trait::async_trait;
use coordinator::{TriggerCoordinator, TriggerNotice, TriggerOutcome, TriggerSource};
use deferred::DeferredTrigger;
use mypa_reminders_api_structs::dtos::{DueEventDTO, PushMessageDTO};
use mypa_reminders_domain::{ItemRef, LocalMoment, OccurrenceKey, ScheduleItem, Tz};
use offline_cache::{OfflineCache, OfflineCacheError};
use presentation::AlarmSurface;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Timezone of the device wall clock
    pub timezone: Tz,
    pub dedup_window_millis: i64,
    /// How old a deferred trigger may be and still be replayed
    pub deferred_window_millis: i64,
    pub snooze_minutes: u32,
    pub refresh_interval_millis: i64,
    pub poll_interval_millis: u64,
    /// A fetch slower than this counts as offline
    pub fetch_timeout_millis: u64,
}

impl DeviceConfig {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            dedup_window_millis: 60 * 1000,
            deferred_window_millis: 5 * 60 * 1000,
            snooze_minutes: 5,
            refresh_interval_millis: 30 * 1000,
            poll_interval_millis: 1000,
            fetch_timeout_millis: 5 * 1000,
        }
    }
}

pub trait IDeviceSys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

pub struct RealDeviceSys {}

impl IDeviceSys for RealDeviceSys {
    fn get_timestamp_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Where the live schedule of the device owner comes from
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_active(&self) -> APIResponse<Vec<ScheduleItem>>;
    async fn deactivate(&self, item: &ItemRef) -> APIResponse<()>;
}

#[async_trait]
impl ScheduleSource for ItemClient {
    async fn fetch_active(&self) -> APIResponse<Vec<ScheduleItem>> {
        self.get_active().await
    }

    async fn deactivate(&self, item: &ItemRef) -> APIResponse<()> {
        ItemClient::deactivate(self, item).await.map(|_| ())
    }
}

pub struct DeviceRuntime {
    coordinator: Arc<Mutex<TriggerCoordinator>>,
    source: Arc<dyn ScheduleSource>,
    sys: Arc<dyn IDeviceSys>,
    config: DeviceConfig,
    last_refresh: Mutex<Option<i64>>,
}

impl DeviceRuntime {
    pub fn new(
        config: DeviceConfig,
        surface: Box<dyn AlarmSurface>,
        cache: OfflineCache,
        source: Arc<dyn ScheduleSource>,
        sys: Arc<dyn IDeviceSys>,
    ) -> Self {
        let coordinator = TriggerCoordinator::new(config.clone(), surface, cache);
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
            source,
            sys,
            config,
            last_refresh: Mutex::new(None),
        }
    }

    /// The coordinator state stays consistent between calls, so a
    /// poisoned lock is still usable.
    /// Never hold the guard across an await.
    pub fn coordinator(&self) -> MutexGuard<'_, TriggerCoordinator> {
        self.coordinator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetches the live schedule, or falls back to the offline cache when
    /// the fetch fails or does not finish within `fetch_timeout_millis`
    pub async fn refresh(&self) {
        let now = self.sys.get_timestamp_millis();
        *self
            .last_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(now);

        let timeout = Duration::from_millis(self.config.fetch_timeout_millis);
        match tokio::time::timeout(timeout, self.source.fetch_active()).await {
            Ok(Ok(items)) => {
                debug!("Fetched {} live items", items.len());
                self.coordinator().load_live(items);
            }
            Ok(Err(e)) => {
                warn!("Unable to fetch the live schedule, using offline cache: {}", e);
                self.coordinator().load_offline();
            }
            Err(_) => {
                warn!(
                    "Fetching the live schedule timed out after {:?}, using offline cache",
                    timeout
                );
                self.coordinator().load_offline();
            }
        }
    }

    fn refresh_is_due(&self, now: i64) -> bool {
        match *self
            .last_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
        {
            Some(last) => now - last >= self.config.refresh_interval_millis,
            None => true,
        }
    }

    /// One iteration of the poll loop
    pub async fn poll(&self) -> Vec<OccurrenceKey> {
        if self.refresh_is_due(self.sys.get_timestamp_millis()) {
            self.refresh().await;
        }
        let now = self.sys.get_timestamp_millis();
        self.coordinator().tick(now)
    }

    pub fn handle_push(&self, message: PushMessageDTO) -> TriggerOutcome {
        let now = self.sys.get_timestamp_millis();
        let mut notice = TriggerNotice::from(&message.event);
        if !message.full_screen {
            debug!("Push for {} is a plain notification", notice.occurrence_key);
            notice.full_screen = false;
        }
        self.coordinator().trigger(notice, TriggerSource::Push, now)
    }

    /// Stores an event that arrived while the app could not present it
    pub fn defer(&self, event: DueEventDTO) -> Result<(), OfflineCacheError> {
        let trigger = DeferredTrigger::new(event, self.sys.get_timestamp_millis());
        self.coordinator().cache_mut().store_pending(trigger)
    }

    /// Replays the trigger from `deep_link`, or else the stored pending
    /// trigger, if it is still fresh. The pending trigger is consumed either way.
    pub fn replay_deferred(&self, deep_link: Option<&str>) -> Option<TriggerOutcome> {
        let now = self.sys.get_timestamp_millis();
        let mut coordinator = self.coordinator();

        let pending = match coordinator.cache_mut().take_pending() {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Unable to take the pending trigger: {}", e);
                None
            }
        };
        let from_link = deep_link.and_then(|link| match DeferredTrigger::from_deep_link(link) {
            Ok(trigger) => Some(trigger),
            Err(e) => {
                warn!("Ignoring deep link: {}", e);
                None
            }
        });

        let trigger = from_link.or(pending)?;
        if !trigger.is_fresh(now, self.config.deferred_window_millis) {
            info!(
                "Deferred trigger for {} is stale, not replaying",
                trigger.event.occurrence_key
            );
            return None;
        }
        Some(coordinator.trigger(
            TriggerNotice::from(&trigger.event),
            TriggerSource::Deferred,
            now,
        ))
    }

    /// Handles the `Done` action. One shot items are also deactivated in
    /// the schedule store, a failure there is only logged since the
    /// dismissal record already suppresses the occurrence on this device.
    pub async fn dismiss(&self, key: &OccurrenceKey) {
        let now = self.sys.get_timestamp_millis();
        let item = self.coordinator().dismiss(key, now);
        if let Some(item) = item {
            if let Err(e) = self.source.deactivate(&item).await {
                warn!("Unable to deactivate {}: {}", item, e);
            }
        }
    }

    /// Handles `Remind me later`. Uses the configured snooze when `minutes` is `None`.
    pub fn snooze(&self, key: &OccurrenceKey, minutes: Option<u32>) -> bool {
        let now = self.sys.get_timestamp_millis();
        let minutes = minutes.unwrap_or(self.config.snooze_minutes);
        self.coordinator().snooze(key, minutes, now)
    }

    /// Prepares the device state and starts the poll loop and the push
    /// consumer. Must be called within a tokio runtime.
    pub async fn start(
        self: Arc<Self>,
        mut pushes: mpsc::Receiver<PushMessageDTO>,
        deep_link: Option<String>,
    ) -> RuntimeHandle {
        let now = self.sys.get_timestamp_millis();
        if let Some(today) = LocalMoment::at(now, &self.config.timezone) {
            let purged = self.coordinator().purge_dismissals(&today.date);
            debug!("Purged {} old dismissals", purged);
        }
        self.refresh().await;
        self.replay_deferred(deep_link.as_deref());

        let runtime = self.clone();
        let poll = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_millis(runtime.config.poll_interval_millis));
            loop {
                interval.tick().await;
                runtime.poll().await;
            }
        });

        let runtime = self;
        let push = tokio::spawn(async move {
            while let Some(message) = pushes.recv().await {
                runtime.handle_push(message);
            }
            debug!("Push channel closed");
        });

        RuntimeHandle { poll, push }
    }
}

pub struct RuntimeHandle {
    poll: JoinHandle<()>,
    push: JoinHandle<()>,
}

impl RuntimeHandle {
    pub fn stop(self) {
        self.poll.abort();
        self.push.abort();
    }
}
