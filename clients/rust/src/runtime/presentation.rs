use mypa_reminders_domain::{OccurrenceKey, Presentation, VoiceGender};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
#[error("Playback failed: {0}")]
pub struct PlaybackError(pub String);

/// Something that keeps going until it is stopped: an audio stream,
/// a speech restart loop or a vibration pulse
pub trait Playback: Send {
    fn stop(&mut self);
}

/// The platform side of presenting an occurrence
pub trait AlarmSurface: Send {
    fn play_audio(&mut self, audio_ref: &str, looping: bool)
        -> Result<Box<dyn Playback>, PlaybackError>;
    fn speak(
        &mut self,
        text: &str,
        language: &str,
        voice_gender: VoiceGender,
        looping: bool,
    ) -> Result<Box<dyn Playback>, PlaybackError>;
    fn play_tone(&mut self, looping: bool) -> Result<Box<dyn Playback>, PlaybackError>;
    /// `None` on devices that can not vibrate
    fn start_vibration(&mut self) -> Option<Box<dyn Playback>>;
    /// Shows the modal with the `Done` and `Remind me later` actions
    fn show_modal(&mut self, key: &OccurrenceKey, presentation: &Presentation, snooze_minutes: u32);
    fn close_modal(&mut self, key: &OccurrenceKey);
    /// A plain system notification, used on endpoints without full screen support
    fn show_notification(&mut self, key: &OccurrenceKey, presentation: &Presentation);
    fn close_notification(&mut self, key: &OccurrenceKey);
}

/// The running side effects of one presented occurrence.
///
/// Everything is stopped through `cancel`. Stopping is idempotent, a
/// second call finds nothing left to stop.
#[derive(Default)]
pub struct PresentationHandle {
    audio: Option<Box<dyn Playback>>,
    vibration: Option<Box<dyn Playback>>,
}

impl PresentationHandle {
    pub fn stop_audio(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.stop();
        }
    }

    pub fn cancel(&mut self) {
        self.stop_audio();
        if let Some(mut vibration) = self.vibration.take() {
            vibration.stop();
        }
    }

    pub fn is_playing_audio(&self) -> bool {
        self.audio.is_some()
    }
}

impl Drop for PresentationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Primary audio, then text to speech of the text or title, then a tone.
/// Every failure falls through to the next so there is always some signal.
fn start_audio(surface: &mut dyn AlarmSurface, p: &Presentation) -> Option<Box<dyn Playback>> {
    if let Some(audio_ref) = &p.audio_ref {
        match surface.play_audio(audio_ref, p.looping) {
            Ok(playback) => return Some(playback),
            Err(e) => warn!("{}, falling back to speech", e),
        }
    }

    let text = p.text.as_deref().unwrap_or(&p.title);
    match surface.speak(text, &p.language, p.voice_gender, p.looping) {
        Ok(playback) => return Some(playback),
        Err(e) => warn!("{}, falling back to a tone", e),
    }

    match surface.play_tone(p.looping) {
        Ok(playback) => Some(playback),
        Err(e) => {
            error!("{}, presenting without sound", e);
            None
        }
    }
}

/// Starts presenting an occurrence. The modal is shown even when no
/// sound could be started so the user can always act on it.
///
/// Without `full_screen` only a notification is posted, with no sound or
/// vibration to stop later.
pub fn present(
    surface: &mut dyn AlarmSurface,
    key: &OccurrenceKey,
    presentation: &Presentation,
    snooze_minutes: u32,
    full_screen: bool,
) -> PresentationHandle {
    if !full_screen {
        surface.show_notification(key, presentation);
        return PresentationHandle::default();
    }
    surface.show_modal(key, presentation, snooze_minutes);
    PresentationHandle {
        audio: start_audio(surface, presentation),
        vibration: surface.start_vibration(),
    }
}
