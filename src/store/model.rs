use std::time::Duration;

use crate::catalog::Track;

/// Queue and playback intent as seen by observers.
///
/// `current_index` is `None` iff the queue is empty, except when a caller
/// handed `set_queue` an out-of-range index; `current_track` is then `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub(super) queue: Vec<Track>,
    pub(super) current_index: Option<usize>,
    pub(super) is_playing: bool,
    pub(super) position: Duration,
    pub(super) duration: Duration,
}

impl PlayerState {
    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.queue.get(i))
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track().map(|t| t.id.as_str())
    }

    /// Playing intent, not the engine's actual status.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Last reported playback position.
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Last reported duration of the current track.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}
