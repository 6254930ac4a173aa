use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::Sink;

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::sink::{DeviceOutput, Output, decode, fetch_stream, stream_client};
use super::types::{AudioCmd, AudioEvent, LoadRequest};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    audio_settings: AudioSettings,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("audio".into()).spawn(move || {
        let tick = Duration::from_millis(audio_settings.progress_interval_ms.max(1));
        let mut engine = Engine::new(events, audio_settings, Box::new(DeviceOutput::default()));
        let mut backlog = VecDeque::new();
        let mut last_tick = Instant::now();

        loop {
            let next = match backlog.pop_front() {
                Some(cmd) => Ok(cmd),
                None => rx.recv_timeout(tick),
            };
            match next {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.quit(fade_out_ms);
                    break;
                }
                Ok(AudioCmd::Load(req)) => {
                    backlog.extend(rx.try_iter());
                    if superseded(&backlog) {
                        tracing::debug!(id = %req.id, "load superseded, skipping download");
                    } else {
                        engine.load(req);
                    }
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    engine.unload();
                    break;
                }
            }

            if last_tick.elapsed() >= tick {
                engine.tick();
                last_tick = Instant::now();
            }
        }
    })
}

/// Whether a queued command will replace or drop whatever a pending load
/// would produce.
pub(super) fn superseded(backlog: &VecDeque<AudioCmd>) -> bool {
    backlog.iter().any(|cmd| {
        matches!(
            cmd,
            AudioCmd::Load(_) | AudioCmd::StopAndUnload | AudioCmd::Quit { .. }
        )
    })
}

struct Loaded {
    id: String,
    duration: Duration,
    finished: bool,
}

/// State owned by the audio thread: the output, the single sink and the
/// identity of what it holds.
pub(super) struct Engine {
    settings: AudioSettings,
    events: Sender<AudioEvent>,
    http: Option<reqwest::blocking::Client>,
    output: Box<dyn Output>,
    sink: Option<Sink>,
    loaded: Option<Loaded>,
}

impl Engine {
    pub(super) fn new(events: Sender<AudioEvent>, settings: AudioSettings, output: Box<dyn Output>) -> Self {
        Self {
            settings,
            events,
            http: None,
            output,
            sink: None,
            loaded: None,
        }
    }

    pub(super) fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::InitAudioMode => {
                if let Err(e) = self.output.open() {
                    tracing::warn!(error = %e, "audio mode init failed, continuing without output");
                }
            }
            AudioCmd::Load(req) => self.load(req),
            AudioCmd::Play => {
                if let Some(ref s) = self.sink {
                    if s.is_paused() {
                        s.play();
                    }
                }
            }
            AudioCmd::Pause => {
                if let Some(ref s) = self.sink {
                    s.pause();
                }
            }
            AudioCmd::StopAndUnload => self.unload(),
            AudioCmd::SeekTo(position) => self.seek(position),
            AudioCmd::SeekBy(secs) => {
                let Some(ref s) = self.sink else {
                    return;
                };
                let duration = self.loaded.as_ref().map_or(Duration::ZERO, |l| l.duration);
                let target = seek_target(s.get_pos(), secs, duration);
                self.seek(target);
            }
            // Handled by the thread loop.
            AudioCmd::Quit { .. } => {}
        }
    }

    pub(super) fn load(&mut self, req: LoadRequest) {
        if self.loaded.as_ref().is_some_and(|l| l.id == req.id) {
            tracing::debug!(id = %req.id, "track already loaded");
            return;
        }

        self.unload();

        match self.open(&req) {
            Ok((sink, duration)) => {
                tracing::info!(id = %req.id, ?duration, "track loaded");
                self.sink = Some(sink);
                self.loaded = Some(Loaded {
                    id: req.id.clone(),
                    duration,
                    finished: false,
                });
                self.emit(AudioEvent::Progress {
                    track_id: req.id,
                    position: Duration::ZERO,
                    duration,
                });
            }
            Err(e) => {
                tracing::warn!(id = %req.id, error = %e, "failed to load track");
                self.emit(AudioEvent::LoadFailed {
                    track_id: req.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn open(&mut self, req: &LoadRequest) -> Result<(Sink, Duration), AudioError> {
        let bytes = fetch_stream(self.http_client()?, &req.url)?;
        let (source, duration) = decode(req, bytes)?;
        let sink = self.output.connect(source, self.settings.volume)?;
        Ok((sink, duration))
    }

    /// Stop and drop the sink. Safe to call with nothing loaded.
    pub(super) fn unload(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.loaded = None;
    }

    fn seek(&self, position: Duration) {
        let Some(ref s) = self.sink else {
            return;
        };
        if let Err(e) = s.try_seek(position) {
            tracing::warn!(?position, error = %e, "seek failed");
        }
    }

    pub(super) fn tick(&mut self) {
        let (Some(s), Some(loaded)) = (self.sink.as_ref(), self.loaded.as_mut()) else {
            return;
        };
        if loaded.finished {
            return;
        }

        if s.empty() {
            loaded.finished = true;
            let track_id = loaded.id.clone();
            tracing::debug!(id = %track_id, "track finished");
            self.emit(AudioEvent::Finished { track_id });
        } else {
            let event = AudioEvent::Progress {
                track_id: loaded.id.clone(),
                position: s.get_pos(),
                duration: loaded.duration,
            };
            self.emit(event);
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(ref s) = self.sink {
            // Fade out gently before stopping.
            fade_out_sink(s, fade_out_ms);
        }
        self.unload();
    }

    fn http_client(&mut self) -> Result<&reqwest::blocking::Client, AudioError> {
        if self.http.is_none() {
            self.http = Some(stream_client(&self.settings)?);
        }
        self.http.as_ref().ok_or(AudioError::Disconnected)
    }

    #[cfg(test)]
    pub(super) fn loaded_id(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.id.as_str())
    }

    #[cfg(test)]
    pub(super) fn is_paused(&self) -> Option<bool> {
        self.sink.as_ref().map(Sink::is_paused)
    }

    fn emit(&self, event: AudioEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Position after moving `delta_secs` from `current`, kept within
/// `0..=duration` when the duration is known.
pub(super) fn seek_target(current: Duration, delta_secs: i64, duration: Duration) -> Duration {
    let delta = Duration::from_secs(delta_secs.unsigned_abs());
    let target = if delta_secs < 0 {
        current.saturating_sub(delta)
    } else {
        current.saturating_add(delta)
    };
    if duration.is_zero() {
        target
    } else {
        target.min(duration)
    }
}
