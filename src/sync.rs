//! Reconciliation between the player store and the audio engine.
//!
//! The controller subscribes to two narrow projections of the store (the
//! current track id and the play intent). Each change is queued as a
//! `Reaction` and turned into engine commands by `process_pending`, in the
//! order the changes were observed. Engine feedback flows the other way
//! through `apply_audio_event`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::audio::{AudioEngine, AudioEvent};
use crate::catalog::Track;
use crate::store::{PlayerStore, SubscriptionId};

/// A store change the controller still has to act on.
#[derive(Debug, Clone, PartialEq)]
enum Reaction {
    TrackChanged { track: Option<Track>, playing: bool },
    PlayingChanged { playing: bool, track: Option<Track> },
}

pub struct SyncController<E: AudioEngine> {
    engine: E,
    tx: Sender<Reaction>,
    rx: Receiver<Reaction>,
    subscriptions: Option<(SubscriptionId, SubscriptionId)>,
    last_observed_track_id: Option<String>,
    last_observed_is_playing: Option<bool>,
}

impl<E: AudioEngine> SyncController<E> {
    pub fn new(engine: E) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine,
            tx,
            rx,
            subscriptions: None,
            last_observed_track_id: None,
            last_observed_is_playing: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_started(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Initialise the audio mode and subscribe to the store. Calling it
    /// again while started does nothing.
    pub fn start(&mut self, store: &mut PlayerStore) {
        if self.is_started() {
            return;
        }
        self.engine.init_audio_mode();

        let tx = self.tx.clone();
        let track_sub = store.subscribe_with_selector(
            |s| s.current_track_id().map(str::to_owned),
            move |_, state| {
                let _ = tx.send(Reaction::TrackChanged {
                    track: state.current_track().cloned(),
                    playing: state.is_playing(),
                });
            },
        );

        let tx = self.tx.clone();
        let playing_sub = store.subscribe_with_selector(
            |s| s.is_playing(),
            move |&playing, state| {
                let _ = tx.send(Reaction::PlayingChanged {
                    playing,
                    track: state.current_track().cloned(),
                });
            },
        );

        self.subscriptions = Some((track_sub, playing_sub));
        tracing::debug!("sync controller started");
    }

    /// Drop both subscriptions and any reaction not yet processed.
    pub fn stop(&mut self, store: &mut PlayerStore) {
        let Some((track_sub, playing_sub)) = self.subscriptions.take() else {
            return;
        };
        store.unsubscribe(track_sub);
        store.unsubscribe(playing_sub);
        while self.rx.try_recv().is_ok() {}
        tracing::debug!("sync controller stopped");
    }

    /// Issue engine commands for every queued reaction. Returns how many
    /// reactions were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(reaction) = self.rx.try_recv() {
            match reaction {
                Reaction::TrackChanged { track, playing } => self.on_track_changed(track, playing),
                Reaction::PlayingChanged { playing, track } => self.on_playing_changed(playing, track),
            }
            handled += 1;
        }
        handled
    }

    pub fn seek_to(&self, position: Duration) {
        tracing::debug!(?position, "seek");
        self.engine.seek_to(position);
    }

    pub fn seek_by(&self, delta_secs: i64) {
        tracing::debug!(delta_secs, "seek relative");
        self.engine.seek_by(delta_secs);
    }

    fn on_track_changed(&mut self, track: Option<Track>, playing: bool) {
        let new_id = track.as_ref().map(|t| t.id.clone());
        if new_id == self.last_observed_track_id {
            return;
        }

        match track {
            Some(ref t) => {
                self.load(t);
                if !playing {
                    self.engine.pause();
                    self.last_observed_is_playing = Some(false);
                }
            }
            None => {
                tracing::debug!("queue emptied, unloading");
                self.engine.stop_and_unload();
            }
        }
        // Recorded even when the load failed; the same id is not retried
        // until the current track changes.
        self.last_observed_track_id = new_id;
    }

    fn on_playing_changed(&mut self, playing: bool, track: Option<Track>) {
        if self.last_observed_is_playing == Some(playing) {
            return;
        }

        if playing {
            // A restored queue is installed without loading anything.
            if let Some(t) = track.filter(|t| Some(&t.id) != self.last_observed_track_id.as_ref()) {
                self.load(&t);
                self.last_observed_track_id = Some(t.id);
            }
            tracing::debug!("play");
            self.engine.play();
        } else {
            tracing::debug!("pause");
            self.engine.pause();
        }
        self.last_observed_is_playing = Some(playing);
    }

    fn load(&self, track: &Track) {
        tracing::debug!(id = %track.id, "load");
        if let Err(e) = self.engine.load(track) {
            tracing::warn!(id = %track.id, error = %e, "load rejected");
        }
    }
}

/// Feed one engine notification back into the store.
///
/// Notifications for a track other than the current one are stale (a skip
/// raced them) and are dropped.
pub fn apply_audio_event(store: &mut PlayerStore, event: AudioEvent) {
    match event {
        AudioEvent::Progress {
            track_id,
            position,
            duration,
        } => {
            if is_current(store, &track_id) {
                store.set_progress(position, duration);
            }
        }
        AudioEvent::Finished { track_id } => {
            if is_current(store, &track_id) {
                tracing::debug!(id = %track_id, "advancing after track end");
                store.next();
            } else {
                tracing::debug!(id = %track_id, "ignoring stale completion");
            }
        }
        AudioEvent::LoadFailed { track_id, reason } => {
            tracing::warn!(id = %track_id, %reason, "track failed to load");
        }
    }
}

fn is_current(store: &PlayerStore, track_id: &str) -> bool {
    store.state().current_track_id() == Some(track_id)
}
