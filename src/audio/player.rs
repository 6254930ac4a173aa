use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::Track;
use crate::config::AudioSettings;
use crate::error::AudioError;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioEngine, AudioEvent, LoadRequest};

/// Handle to the audio thread, which owns the only output sink.
///
/// Commands are queued and executed in order, so a load always tears down
/// whatever an earlier load left behind.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Result<(Self, Receiver<AudioEvent>), AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<AudioEvent>();

        let audio_handle = spawn_audio_thread(rx, event_tx, audio_settings)
            .map_err(|e| AudioError::Device(e.to_string()))?;

        let player = Self {
            tx,
            join: Mutex::new(Some(audio_handle)),
        };
        Ok((player, event_rx))
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        self.tx.send(cmd).map_err(|_| AudioError::Disconnected)
    }

    fn send_or_log(&self, cmd: AudioCmd) {
        if let Err(e) = self.send(cmd) {
            tracing::warn!(error = %e, "audio command dropped");
        }
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl AudioEngine for AudioPlayer {
    fn init_audio_mode(&self) {
        self.send_or_log(AudioCmd::InitAudioMode);
    }

    fn load(&self, track: &Track) -> Result<(), AudioError> {
        if !track.is_playable() {
            return Err(AudioError::MissingAudioUrl(track.id.clone()));
        }
        self.send(AudioCmd::Load(LoadRequest {
            id: track.id.clone(),
            url: track.audio_url.trim().to_string(),
        }))
    }

    fn play(&self) {
        self.send_or_log(AudioCmd::Play);
    }

    fn pause(&self) {
        self.send_or_log(AudioCmd::Pause);
    }

    fn stop_and_unload(&self) {
        self.send_or_log(AudioCmd::StopAndUnload);
    }

    fn seek_to(&self, position: Duration) {
        self.send_or_log(AudioCmd::SeekTo(position));
    }

    fn seek_by(&self, delta_secs: i64) {
        self.send_or_log(AudioCmd::SeekBy(delta_secs));
    }
}
