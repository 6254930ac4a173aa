//! Audio-related small types: commands, events and the engine seam.

use std::time::Duration;

use crate::catalog::Track;
use crate::error::AudioError;

/// Commands understood by an audio engine. The sync controller is the only
/// caller.
pub trait AudioEngine {
    /// Configure the output session. Failures are logged, never returned.
    fn init_audio_mode(&self);
    /// Stop and unload whatever is loaded, then load `track` and start it.
    /// Loading the track that is already loaded does nothing.
    fn load(&self, track: &Track) -> Result<(), AudioError>;
    fn play(&self);
    fn pause(&self);
    /// Idempotent.
    fn stop_and_unload(&self);
    fn seek_to(&self, position: Duration);
    fn seek_by(&self, delta_secs: i64);
}

/// What the audio thread needs to know about a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: String,
    pub url: String,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Open the output device and apply output settings.
    InitAudioMode,
    Load(LoadRequest),
    Play,
    Pause,
    StopAndUnload,
    SeekTo(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications emitted by the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Progress {
        track_id: String,
        position: Duration,
        duration: Duration,
    },
    /// Sent once per successful load when the track plays to its end.
    Finished { track_id: String },
    LoadFailed { track_id: String, reason: String },
}
