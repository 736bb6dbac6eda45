use crate::{
    schedule_item::{AlarmRepeat, ItemKind, ItemRef, ItemTiming, Presentation, ScheduleItem},
    shared::entity::OwnerId,
    time::{LocalMoment, TimeOfDay},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// The outcome of asking whether a `ScheduleItem` is due at some moment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    /// The time of day that matched. For medicines this tells which dose fired.
    pub time: TimeOfDay,
    /// Whether the item should be deactivated after firing
    pub one_shot: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum EvaluationError {
    #[error("Alarm {0} repeats weekly but has no days")]
    NoRecurringDays(i64),
    #[error("Medicine {0} has no dose times")]
    NoDoseTimes(i64),
}

impl ScheduleItem {
    /// Decides whether `now` is a due instant for this item.
    ///
    /// Comparison is done at minute granularity. Whether the item is active
    /// is up to the caller, except for meetings where the `enabled` flag is part
    /// of the rule.
    pub fn is_due(&self, now: &LocalMoment) -> Result<Option<Due>, EvaluationError> {
        match &self.timing {
            ItemTiming::Alarm {
                time_of_day,
                repeat,
            } => {
                if *time_of_day != now.time {
                    return match repeat {
                        AlarmRepeat::Weekly(days) if days.is_empty() => {
                            Err(EvaluationError::NoRecurringDays(self.id))
                        }
                        _ => Ok(None),
                    };
                }
                let due = match repeat {
                    AlarmRepeat::OnDate(date) => *date == now.date,
                    AlarmRepeat::Weekly(days) => {
                        if days.is_empty() {
                            return Err(EvaluationError::NoRecurringDays(self.id));
                        }
                        days.contains(&now.weekday)
                    }
                    AlarmRepeat::Daily => true,
                };
                Ok(if due {
                    Some(Due {
                        time: *time_of_day,
                        one_shot: self.is_one_shot(),
                    })
                } else {
                    None
                })
            }
            ItemTiming::Medicine { times_of_day } => {
                if times_of_day.is_empty() {
                    return Err(EvaluationError::NoDoseTimes(self.id));
                }
                Ok(times_of_day
                    .iter()
                    .find(|time| **time == now.time)
                    .map(|time| Due {
                        time: *time,
                        one_shot: false,
                    }))
            }
            ItemTiming::Meeting {
                time_of_day, date, ..
            } => {
                if self.active && *date == now.date && *time_of_day == now.time {
                    Ok(Some(Due {
                        time: *time_of_day,
                        one_shot: true,
                    }))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Deterministic identifier of one occurrence: `<kind>-<itemId>-<HH:MM>`.
///
/// It is derived from the same fields on every delivery path so that
/// a device can recognize that a polled and a pushed trigger are the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceKey(String);

impl OccurrenceKey {
    pub fn new(kind: ItemKind, item_id: i64, time: &TimeOfDay) -> Self {
        Self(format!("{}-{}-{}", kind, item_id, time))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OccurrenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OccurrenceKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Ephemeral signal that an occurrence is due. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DueEvent {
    pub item: ItemRef,
    pub owner_id: OwnerId,
    pub occurrence_key: OccurrenceKey,
    pub one_shot: bool,
    pub presentation: Presentation,
}

impl DueEvent {
    pub fn new(item: &ScheduleItem, due: &Due) -> Self {
        Self {
            item: item.item_ref(),
            owner_id: item.owner_id.clone(),
            occurrence_key: OccurrenceKey::new(item.kind(), item.id, &due.time),
            one_shot: due.one_shot,
            presentation: item.presentation.clone(),
        }
    }
}
