use mypa_reminders_domain::{ItemTiming, OwnerId, Presentation, ScheduleItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemDTO {
    pub id: i64,
    pub owner_id: OwnerId,
    pub active: bool,
    pub presentation: Presentation,
    pub timing: ItemTiming,
}

impl ScheduleItemDTO {
    pub fn new(item: ScheduleItem) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            active: item.active,
            presentation: item.presentation,
            timing: item.timing,
        }
    }
}

impl From<ScheduleItemDTO> for ScheduleItem {
    fn from(dto: ScheduleItemDTO) -> Self {
        Self {
            id: dto.id,
            owner_id: dto.owner_id,
            active: dto.active,
            presentation: dto.presentation,
            timing: dto.timing,
        }
    }
}
