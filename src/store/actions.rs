use std::time::Duration;

use crate::catalog::Track;

use super::PlayerStore;

impl PlayerStore {
    /// Replace the whole queue and start playing at `initial_index`.
    ///
    /// The index is not validated: an out-of-range value leaves the store
    /// with no current track.
    pub fn set_queue(&mut self, tracks: Vec<Track>, initial_index: usize) {
        if tracks.is_empty() {
            self.state.queue.clear();
            self.select(None);
            self.state.is_playing = false;
        } else {
            self.state.queue = tracks;
            self.select(Some(initial_index));
            self.state.is_playing = true;
        }
        tracing::debug!(
            len = self.state.queue.len(),
            index = ?self.state.current_index,
            "queue replaced"
        );
        self.commit();
        self.persist();
    }

    /// Jump to `index`. Out-of-range indices are ignored.
    pub fn play_track_at_index(&mut self, index: usize) {
        if index >= self.state.queue.len() {
            return;
        }
        self.select(Some(index));
        self.state.is_playing = true;
        self.commit();
        self.persist();
    }

    pub fn play(&mut self) {
        self.state.is_playing = true;
        self.commit();
    }

    pub fn pause(&mut self) {
        self.state.is_playing = false;
        self.commit();
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance one entry. No-op on the last entry; there is no wraparound.
    pub fn next(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        if current + 1 >= self.state.queue.len() {
            return;
        }
        self.step_to(current + 1);
    }

    /// Step back one entry. No-op on the first entry.
    pub fn previous(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        if current == 0 || current - 1 >= self.state.queue.len() {
            return;
        }
        self.step_to(current - 1);
    }

    /// Append to the queue without touching the current entry or intent.
    pub fn add_to_queue(&mut self, track: Track) {
        self.state.queue.push(track);
        self.commit();
        self.persist();
    }

    /// Remove one entry, keeping the current index pointing at the same
    /// track where possible. Removing the current track moves to the entry
    /// that took its place, or the new last entry.
    pub fn remove_from_queue(&mut self, index: usize) {
        if index >= self.state.queue.len() {
            return;
        }
        self.state.queue.remove(index);

        let len = self.state.queue.len();
        let new_index = if len == 0 {
            None
        } else {
            match self.state.current_index {
                Some(current) if index < current => Some(current - 1),
                Some(current) if index == current => Some(current.min(len - 1)),
                other => other,
            }
        };

        self.select(new_index);
        self.state.is_playing = len > 0;
        self.commit();
        self.persist();
    }

    /// Move one entry from `from` to `to`, shifting the entries between.
    pub fn move_queue_item(&mut self, from: usize, to: usize) {
        let len = self.state.queue.len();
        if from >= len || to >= len {
            return;
        }

        let item = self.state.queue.remove(from);
        self.state.queue.insert(to, item);

        if let Some(current) = self.state.current_index {
            self.state.current_index = Some(if from == current {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            });
        }

        self.commit();
        self.persist();
    }

    /// Record engine progress. Touches nothing else.
    pub fn set_progress(&mut self, position: Duration, duration: Duration) {
        self.state.position = position;
        self.state.duration = duration;
        self.commit();
    }

    /// Install the persisted queue, paused.
    ///
    /// Missing, malformed or empty snapshots leave the in-memory queue as
    /// it is. Returns whether anything was restored.
    pub fn restore_queue(&mut self) -> bool {
        let Some(snapshot) = self.persistence.load() else {
            return false;
        };
        if snapshot.queue.is_empty() {
            return false;
        }

        let len = snapshot.queue.len();
        let index = usize::try_from(snapshot.current_index)
            .ok()
            .filter(|&i| i < len)
            .unwrap_or(0);

        self.state.queue = snapshot.queue;
        self.select(Some(index));
        self.state.is_playing = false;
        tracing::info!(len, index, "restored queue");
        self.commit();
        true
    }

    fn step_to(&mut self, index: usize) {
        self.select(Some(index));
        self.state.is_playing = true;
        self.state.position = Duration::ZERO;
        self.commit();
        self.persist();
    }

    /// Point at `index`, zeroing progress when the current track changes.
    fn select(&mut self, index: Option<usize>) {
        let before = self.state.current_track_id().map(str::to_owned);
        self.state.current_index = index;
        if self.state.current_track_id() != before.as_deref() {
            self.state.position = Duration::ZERO;
            self.state.duration = Duration::ZERO;
        }
    }
}
