use crate::{shared::entity::OwnerId, time::TimeOfDay};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// The three kinds of things a user can be reminded about.
/// Ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Alarm,
    Medicine,
    Meeting,
}

impl ItemKind {
    pub fn all() -> [ItemKind; 3] {
        [ItemKind::Alarm, ItemKind::Medicine, ItemKind::Meeting]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alarm => "alarm",
            Self::Medicine => "medicine",
            Self::Meeting => "meeting",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Item kind: `{0}` is not one of alarm, medicine or meeting")]
pub struct InvalidItemKind(String);

impl FromStr for ItemKind {
    type Err = InvalidItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alarm" => Ok(Self::Alarm),
            "medicine" => Ok(Self::Medicine),
            "meeting" => Ok(Self::Meeting),
            _ => Err(InvalidItemKind(s.to_string())),
        }
    }
}

/// Identifies a `ScheduleItem` across all kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: i64,
}

impl Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Female,
    Male,
}

impl Default for VoiceGender {
    fn default() -> Self {
        Self::Female
    }
}

/// What the device should show and play when an occurrence is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub title: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub duration_seconds: u32,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    pub language: String,
    #[serde(default)]
    pub voice_gender: VoiceGender,
}

impl Presentation {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            text: None,
            audio_ref: None,
            image_ref: None,
            duration_seconds: 30,
            looping: false,
            language: "en-US".into(),
            voice_gender: VoiceGender::default(),
        }
    }
}

/// How an alarm repeats. At most one of recurring days and a specific
/// date can decide when an alarm is due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AlarmRepeat {
    /// Every week on the given days
    Weekly(Vec<Weekday>),
    /// Once, on the given date
    OnDate(NaiveDate),
    /// Every day while the alarm is active
    Daily,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTiming {
    #[error("An alarm can not have both recurring days and a specific date")]
    ConflictingRepeat,
    #[error("A medicine needs at least one dose time")]
    NoDoseTimes,
}

impl AlarmRepeat {
    /// Builds the repeat rule from the two optional storage fields
    pub fn from_parts(
        recurring_days: Vec<Weekday>,
        specific_date: Option<NaiveDate>,
    ) -> Result<Self, InvalidTiming> {
        match (recurring_days.is_empty(), specific_date) {
            (false, Some(_)) => Err(InvalidTiming::ConflictingRepeat),
            (false, None) => {
                let mut days = Vec::with_capacity(recurring_days.len());
                for day in recurring_days {
                    if !days.contains(&day) {
                        days.push(day);
                    }
                }
                Ok(Self::Weekly(days))
            }
            (true, Some(date)) => Ok(Self::OnDate(date)),
            (true, None) => Ok(Self::Daily),
        }
    }

    pub fn recurring_days(&self) -> &[Weekday] {
        match self {
            Self::Weekly(days) => days,
            _ => &[],
        }
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        match self {
            Self::OnDate(date) => Some(*date),
            _ => None,
        }
    }
}

/// Kind specific timing of a `ScheduleItem`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemTiming {
    #[serde(rename_all = "camelCase")]
    Alarm {
        time_of_day: TimeOfDay,
        repeat: AlarmRepeat,
    },
    /// Daily doses, every entry is evaluated on its own
    #[serde(rename_all = "camelCase")]
    Medicine { times_of_day: Vec<TimeOfDay> },
    #[serde(rename_all = "camelCase")]
    Meeting {
        time_of_day: TimeOfDay,
        date: NaiveDate,
        #[serde(default)]
        location: Option<String>,
    },
}

impl ItemTiming {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Alarm { .. } => ItemKind::Alarm,
            Self::Medicine { .. } => ItemKind::Medicine,
            Self::Meeting { .. } => ItemKind::Meeting,
        }
    }
}

/// A scheduled alarm, medicine or meeting owned by a user.
///
/// For meetings `active` is the meeting's `enabled` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: i64,
    pub owner_id: OwnerId,
    pub active: bool,
    pub presentation: Presentation,
    pub timing: ItemTiming,
}

impl ScheduleItem {
    pub fn new(id: i64, owner_id: OwnerId, presentation: Presentation, timing: ItemTiming) -> Self {
        Self {
            id,
            owner_id,
            active: true,
            presentation,
            timing,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.timing.kind()
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            kind: self.kind(),
            id: self.id,
        }
    }

    /// Alarms on a specific date and meetings are consumed after firing
    pub fn is_one_shot(&self) -> bool {
        match &self.timing {
            ItemTiming::Alarm { repeat, .. } => matches!(repeat, AlarmRepeat::OnDate(_)),
            ItemTiming::Medicine { .. } => false,
            ItemTiming::Meeting { .. } => true,
        }
    }
}
