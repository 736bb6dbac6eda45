use mypa_reminders_domain::{
    DueEvent, ItemKind, ItemRef, OccurrenceKey, Presentation, VoiceGender,
};
use serde::{Deserialize, Serialize};

/// The due event payload as it travels to a device
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueEventDTO {
    pub occurrence_key: OccurrenceKey,
    pub kind: ItemKind,
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub duration_seconds: u32,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    pub language: String,
    #[serde(default)]
    pub voice_gender: VoiceGender,
    #[serde(default)]
    pub one_shot: bool,
}

impl DueEventDTO {
    pub fn new(event: &DueEvent) -> Self {
        let p = &event.presentation;
        Self {
            occurrence_key: event.occurrence_key.clone(),
            kind: event.item.kind,
            id: event.item.id,
            title: p.title.clone(),
            text: p.text.clone(),
            audio_ref: p.audio_ref.clone(),
            image_ref: p.image_ref.clone(),
            duration_seconds: p.duration_seconds,
            looping: p.looping,
            language: p.language.clone(),
            voice_gender: p.voice_gender,
            one_shot: event.one_shot,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            kind: self.kind,
            id: self.id,
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            title: self.title.clone(),
            text: self.text.clone(),
            audio_ref: self.audio_ref.clone(),
            image_ref: self.image_ref.clone(),
            duration_seconds: self.duration_seconds,
            looping: self.looping,
            language: self.language.clone(),
            voice_gender: self.voice_gender,
        }
    }
}

/// Body of a push delivery to one device endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessageDTO {
    pub event: DueEventDTO,
    /// `false` for notification only devices, they render a plain notification
    pub full_screen: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use mypa_reminders_domain::{Due, ItemTiming, OwnerId, ScheduleItem};

    #[test]
    fn it_serializes_the_minimal_payload_shape() {
        let mut presentation = Presentation::new("Standup");
        presentation.looping = true;
        let item = ScheduleItem::new(
            9,
            OwnerId::new("owner"),
            presentation,
            ItemTiming::Meeting {
                time_of_day: "10:00".parse().unwrap(),
                date: "2026-10-19".parse().unwrap(),
                location: None,
            },
        );
        let due = Due {
            time: "10:00".parse().unwrap(),
            one_shot: true,
        };
        let dto = DueEventDTO::new(&DueEvent::new(&item, &due));
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["occurrenceKey"], "meeting-9-10:00");
        assert_eq!(json["kind"], "meeting");
        assert_eq!(json["id"], 9);
        assert_eq!(json["loop"], true);
        assert_eq!(json["durationSeconds"], 30);
        assert!(json.get("audioRef").is_none());
        assert!(json.get("ownerId").is_none());

        let parsed: DueEventDTO = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.item_ref(), item.item_ref());
        assert_eq!(parsed.presentation(), item.presentation);
    }
}
