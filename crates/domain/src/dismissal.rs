use crate::{occurrence::OccurrenceKey, time::TimeOfDay};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Device local record of the user acting on an occurrence.
/// Used to suppress the same occurrence for the rest of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRecord {
    pub occurrence_key: OccurrenceKey,
    pub dismissed_at: TimeOfDay,
    pub date: NaiveDate,
}

impl DismissalRecord {
    pub fn matches(&self, key: &OccurrenceKey, date: &NaiveDate) -> bool {
        self.occurrence_key == *key && self.date == *date
    }
}
