use mypa_reminders_api_structs::dtos::DueEventDTO;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEEP_LINK_BASE: &str = "mypa://trigger";

/// A due event that reached the device while the app was not running.
/// It is replayed once when the app comes to the foreground, if still fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredTrigger {
    pub event: DueEventDTO,
    /// Millis timestamp of when the event was delivered
    pub issued_at: i64,
}

#[derive(Error, Debug)]
pub enum DeferredTriggerError {
    #[error("Invalid deep link: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Deep link `{0}` is not a trigger link")]
    NotATrigger(String),
    #[error("Deep link is missing the `{0}` parameter")]
    MissingParameter(&'static str),
    #[error("Deep link carries a malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),
    #[error("Deep link carries a malformed timestamp: `{0}`")]
    MalformedTimestamp(String),
}

impl DeferredTrigger {
    pub fn new(event: DueEventDTO, issued_at: i64) -> Self {
        Self { event, issued_at }
    }

    /// Parses `mypa://trigger?event=<json>&issuedAt=<millis>`
    pub fn from_deep_link(link: &str) -> Result<Self, DeferredTriggerError> {
        let url = Url::parse(link)?;
        if url.scheme() != "mypa" || url.host_str() != Some("trigger") {
            return Err(DeferredTriggerError::NotATrigger(link.to_string()));
        }

        let mut event = None;
        let mut issued_at = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "event" => event = Some(value.into_owned()),
                "issuedAt" => issued_at = Some(value.into_owned()),
                _ => (),
            }
        }
        let event = event.ok_or(DeferredTriggerError::MissingParameter("event"))?;
        let issued_at = issued_at.ok_or(DeferredTriggerError::MissingParameter("issuedAt"))?;

        Ok(Self {
            event: serde_json::from_str(&event)?,
            issued_at: issued_at
                .parse()
                .map_err(|_| DeferredTriggerError::MalformedTimestamp(issued_at.clone()))?,
        })
    }

    pub fn to_deep_link(&self) -> Result<String, DeferredTriggerError> {
        let mut url = Url::parse(DEEP_LINK_BASE)?;
        url.query_pairs_mut()
            .append_pair("event", &serde_json::to_string(&self.event)?)
            .append_pair("issuedAt", &self.issued_at.to_string());
        Ok(url.to_string())
    }

    /// Whether the trigger was issued within `window_millis` before `now`
    pub fn is_fresh(&self, now: i64, window_millis: i64) -> bool {
        (0..=window_millis).contains(&(now - self.issued_at))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mypa_reminders_domain::{ItemKind, OccurrenceKey, VoiceGender};

    fn event() -> DueEventDTO {
        DueEventDTO {
            occurrence_key: OccurrenceKey::from("meeting-3-10:00"),
            kind: ItemKind::Meeting,
            id: 3,
            title: "Standup & planning".into(),
            text: Some("Room 4?".into()),
            audio_ref: None,
            image_ref: None,
            duration_seconds: 30,
            looping: false,
            language: "en-US".into(),
            voice_gender: VoiceGender::Female,
            one_shot: true,
        }
    }

    #[test]
    fn it_parses_its_own_deep_links() {
        let trigger = DeferredTrigger::new(event(), 1_000);
        let link = trigger.to_deep_link().unwrap();
        assert!(link.starts_with("mypa://trigger?event="));

        let parsed = DeferredTrigger::from_deep_link(&link).unwrap();
        assert_eq!(parsed, trigger);
    }

    #[test]
    fn it_rejects_other_links() {
        assert!(matches!(
            DeferredTrigger::from_deep_link("mypa://settings?event=1"),
            Err(DeferredTriggerError::NotATrigger(_))
        ));
        assert!(matches!(
            DeferredTrigger::from_deep_link("mypa://trigger?issuedAt=5"),
            Err(DeferredTriggerError::MissingParameter("event"))
        ));
        assert!(matches!(
            DeferredTrigger::from_deep_link("mypa://trigger?event=%7B&issuedAt=5"),
            Err(DeferredTriggerError::MalformedEvent(_))
        ));
        assert!(DeferredTrigger::from_deep_link("not a link").is_err());
    }

    #[test]
    fn freshness_is_bounded_by_window() {
        let trigger = DeferredTrigger::new(event(), 10_000);
        let window = 5 * 60 * 1000;
        assert!(trigger.is_fresh(10_000, window));
        assert!(trigger.is_fresh(10_000 + window, window));
        assert!(!trigger.is_fresh(10_001 + window, window));
        assert!(!trigger.is_fresh(9_000, window));
    }
}
