mod device;
mod dismissal;
mod occurrence;
mod schedule_item;
mod scheduler;
mod shared;
mod time;

pub use device::{DeviceClass, DeviceEndpoint, EndpointKeys, Platform, UnknownVariant};
pub use dismissal::DismissalRecord;
pub use occurrence::{Due, DueEvent, EvaluationError, OccurrenceKey};
pub use schedule_item::{
    AlarmRepeat, InvalidItemKind, InvalidTiming, ItemKind, ItemRef, ItemTiming, Presentation,
    ScheduleItem, VoiceGender,
};
pub use scheduler::{DispatchReport, SchedulerPhase, TickReport};
pub use shared::entity::{Entity, InvalidIDError, OwnerId, ID};
pub use time::{InvalidTimeOfDay, LocalMoment, TimeOfDay};

pub use chrono::{NaiveDate, Weekday};
pub use chrono_tz::Tz;
