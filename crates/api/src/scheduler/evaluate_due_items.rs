use crate::{
    dispatch::DispatchDueEventUseCase,
    shared::usecase::{execute, Subscriber, UseCase},
};
use mypa_reminders_domain::{DueEvent, LocalMoment, SchedulerPhase, TickReport};
use mypa_reminders_infra::ReminderContext;
use tracing::{error, info, warn};

/// One tick of the time window scheduler.
///
/// Evaluates every active item against the current minute in the
/// evaluation timezone, dispatches the due ones and deactivates one-shots.
/// There is no record of what was already dispatched, running the tick
/// twice in the same minute dispatches twice. Devices deduplicate.
#[derive(Debug)]
pub struct EvaluateDueItemsUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

fn set_phase(ctx: &ReminderContext, phase: SchedulerPhase) {
    if let Ok(mut status) = ctx.scheduler_status.write() {
        status.phase = phase;
    }
}

impl EvaluateDueItemsUseCase {
    async fn evaluate(&self, now: i64, ctx: &ReminderContext) -> (Vec<DueEvent>, TickReport) {
        let mut report = TickReport {
            timestamp: now,
            ..Default::default()
        };
        let moment = match LocalMoment::at(now, &ctx.config.evaluation_timezone) {
            Some(moment) => moment,
            None => {
                error!("Unable to resolve timestamp {} to a wall clock time", now);
                return (Vec::new(), report);
            }
        };
        let items = match ctx.repos.schedule_items.find_active(None).await {
            Ok(items) => items,
            Err(e) => {
                error!("Unable to load active schedule items: {:?}", e);
                return (Vec::new(), report);
            }
        };

        let mut due_events = Vec::new();
        for item in &items {
            report.evaluated += 1;
            match item.is_due(&moment) {
                Ok(Some(due)) => due_events.push(DueEvent::new(item, &due)),
                Ok(None) => (),
                Err(e) => {
                    warn!("Skipping {}: {}", item.item_ref(), e);
                    report.skipped += 1;
                }
            }
        }
        report.due = due_events.len();

        (due_events, report)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for EvaluateDueItemsUseCase {
    type Response = TickReport;

    type Error = UseCaseError;

    const NAME: &'static str = "EvaluateDueItems";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();

        set_phase(ctx, SchedulerPhase::Evaluating);
        let (due_events, mut report) = self.evaluate(now, ctx).await;

        set_phase(ctx, SchedulerPhase::Dispatching);
        for event in due_events {
            let item = event.item;
            let one_shot = event.one_shot;
            let dispatched = match execute(DispatchDueEventUseCase { event }, ctx).await {
                Ok(dispatched) => dispatched,
                Err(e) => match e {},
            };
            report.add_dispatch(&dispatched);

            if one_shot {
                // Best effort. If this fails the item fires again on its next matching minute.
                match ctx.repos.schedule_items.set_active(&item, false).await {
                    Ok(true) => report.deactivated += 1,
                    Ok(false) => warn!("One-shot {} disappeared before deactivation", item),
                    Err(e) => error!("Unable to deactivate one-shot {}: {:?}", item, e),
                }
            }
        }
        set_phase(ctx, SchedulerPhase::Idle);

        if report.due > 0 || report.skipped > 0 {
            info!("Scheduler tick: {:?}", report);
        }
        Ok(report)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RecordLastTick)]
    }
}

/// Makes the latest tick visible to the health endpoint
pub struct RecordLastTick;

#[async_trait::async_trait(?Send)]
impl Subscriber<EvaluateDueItemsUseCase> for RecordLastTick {
    async fn notify(&self, report: &TickReport, ctx: &ReminderContext) {
        if let Ok(mut status) = ctx.scheduler_status.write() {
            status.last_tick = Some(*report);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mypa_reminders_api_structs::dtos::PushMessageDTO;
    use mypa_reminders_domain::{
        AlarmRepeat, DeviceClass, DeviceEndpoint, EndpointKeys, ItemKind, ItemRef, ItemTiming,
        NaiveDate, OwnerId, Platform, Presentation, ScheduleItem, Tz, Weekday,
    };
    use mypa_reminders_infra::{DeliveryOutcome, IPushTransport, StaticTimeSys};
    use std::sync::{Arc, Mutex};

    struct RecordingTransport {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl IPushTransport for RecordingTransport {
        async fn send(&self, _: &DeviceEndpoint, message: &PushMessageDTO) -> DeliveryOutcome {
            self.sent
                .lock()
                .unwrap()
                .push(message.event.occurrence_key.to_string());
            DeliveryOutcome::Delivered
        }
    }

    // Mon Oct 19 2026 07:00:12 UTC
    const MONDAY_0700: i64 = 1792393212000;

    fn alarm(id: i64, owner: &str, time: &str, repeat: AlarmRepeat) -> ScheduleItem {
        ScheduleItem::new(
            id,
            OwnerId::new(owner),
            Presentation::new("Alarm"),
            ItemTiming::Alarm {
                time_of_day: time.parse().unwrap(),
                repeat,
            },
        )
    }

    async fn setup(now: i64, items: Vec<ScheduleItem>) -> (ReminderContext, Arc<RecordingTransport>) {
        let mut ctx = ReminderContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys(now));
        ctx.config.evaluation_timezone = Tz::UTC;
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        ctx.push = transport.clone();
        for owner in ["alice", "bob"] {
            ctx.repos
                .device_endpoints
                .upsert(&DeviceEndpoint::new(
                    OwnerId::new(owner),
                    format!("https://push/{}", owner),
                    EndpointKeys {
                        p256dh: "key".into(),
                        auth: "auth".into(),
                    },
                    Platform::Android,
                    DeviceClass::Mobile,
                    true,
                    0,
                ))
                .await
                .unwrap();
        }
        for item in items {
            ctx.repos.schedule_items.insert(&item).await.unwrap();
        }
        (ctx, transport)
    }

    #[test]
    fn monday_fixture_is_seven_o_clock() {
        let moment = LocalMoment::at(MONDAY_0700, &Tz::UTC).unwrap();
        assert_eq!(moment.weekday, Weekday::Mon);
        assert_eq!(moment.time.to_string(), "07:00");
    }

    #[actix_web::test]
    async fn dispatches_due_items_and_deactivates_one_shots() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let items = vec![
            alarm(1, "alice", "07:00", AlarmRepeat::Weekly(vec![Weekday::Mon])),
            alarm(2, "alice", "07:00", AlarmRepeat::Weekly(vec![Weekday::Tue])),
            alarm(3, "bob", "07:00", AlarmRepeat::OnDate(monday)),
            alarm(4, "bob", "07:01", AlarmRepeat::Daily),
            ScheduleItem::new(
                5,
                OwnerId::new("bob"),
                Presentation::new("Standup"),
                ItemTiming::Meeting {
                    time_of_day: "07:00".parse().unwrap(),
                    date: monday,
                    location: None,
                },
            ),
        ];
        let (ctx, transport) = setup(MONDAY_0700, items).await;

        let report = execute(EvaluateDueItemsUseCase, &ctx).await.unwrap();
        assert_eq!(report.evaluated, 5);
        assert_eq!(report.due, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.deactivated, 2);

        let mut sent = transport.sent.lock().unwrap().clone();
        sent.sort();
        assert_eq!(
            sent,
            vec!["alarm-1-07:00", "alarm-3-07:00", "meeting-5-07:00"]
        );

        let date_alarm = ItemRef {
            kind: ItemKind::Alarm,
            id: 3,
        };
        assert!(!ctx.repos.schedule_items.find(&date_alarm).await.unwrap().unwrap().active);
        let weekly = ItemRef {
            kind: ItemKind::Alarm,
            id: 1,
        };
        assert!(ctx.repos.schedule_items.find(&weekly).await.unwrap().unwrap().active);

        let status = ctx.scheduler_status.read().unwrap().clone();
        assert_eq!(status.phase, SchedulerPhase::Idle);
        assert_eq!(status.last_tick, Some(report));
    }

    #[actix_web::test]
    async fn malformed_item_does_not_block_the_others() {
        let items = vec![
            alarm(1, "alice", "07:00", AlarmRepeat::Weekly(vec![])),
            ScheduleItem::new(
                2,
                OwnerId::new("alice"),
                Presentation::new("Pill"),
                ItemTiming::Medicine {
                    times_of_day: vec!["07:00".parse().unwrap()],
                },
            ),
        ];
        let (ctx, transport) = setup(MONDAY_0700, items).await;

        let report = execute(EvaluateDueItemsUseCase, &ctx).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.due, 1);
        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec!["medicine-2-07:00".to_string()]
        );
    }

    #[actix_web::test]
    async fn fired_one_shot_is_not_dispatched_again() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let items = vec![alarm(3, "bob", "07:00", AlarmRepeat::OnDate(monday))];
        let (ctx, transport) = setup(MONDAY_0700, items).await;

        execute(EvaluateDueItemsUseCase, &ctx).await.unwrap();
        let second = execute(EvaluateDueItemsUseCase, &ctx).await.unwrap();
        assert_eq!(second.evaluated, 0);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
