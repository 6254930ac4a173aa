use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use rodio::Sink;
use rodio::queue::SourcesQueueOutput;

use crate::catalog::Track;
use crate::error::AudioError;

use super::AudioEngine;
use super::sink::{Output, StreamDecoder};

/// One recorded `AudioEngine` call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    InitAudioMode,
    Load(String),
    Play,
    Pause,
    StopAndUnload,
    SeekTo(Duration),
    SeekBy(i64),
}

/// Engine double that records every command it receives. Loads of
/// tracks without an audio url are rejected like the real adapter does.
#[derive(Default)]
pub(crate) struct RecordingEngine {
    calls: RefCell<Vec<Call>>,
}

impl RecordingEngine {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl AudioEngine for RecordingEngine {
    fn init_audio_mode(&self) {
        self.calls.borrow_mut().push(Call::InitAudioMode);
    }

    fn load(&self, track: &Track) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(Call::Load(track.id.clone()));
        if track.is_playable() {
            Ok(())
        } else {
            Err(AudioError::MissingAudioUrl(track.id.clone()))
        }
    }

    fn play(&self) {
        self.calls.borrow_mut().push(Call::Play);
    }

    fn pause(&self) {
        self.calls.borrow_mut().push(Call::Pause);
    }

    fn stop_and_unload(&self) {
        self.calls.borrow_mut().push(Call::StopAndUnload);
    }

    fn seek_to(&self, position: Duration) {
        self.calls.borrow_mut().push(Call::SeekTo(position));
    }

    fn seek_by(&self, delta_secs: i64) {
        self.calls.borrow_mut().push(Call::SeekBy(delta_secs));
    }
}

/// Output with no device behind it. Sinks are detached and only advance
/// when a test pulls samples through `pull`.
#[derive(Default, Clone)]
pub(super) struct DetachedOutput {
    opened: Rc<Cell<usize>>,
    queues: Rc<RefCell<Vec<SourcesQueueOutput>>>,
}

impl DetachedOutput {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    /// Number of sinks created so far.
    pub fn connects(&self) -> usize {
        self.queues.borrow().len()
    }

    /// Consume `samples` samples from the newest sink, as a device would.
    pub fn pull(&self, samples: usize) {
        if let Some(queue) = self.queues.borrow_mut().last_mut() {
            queue.by_ref().take(samples).for_each(drop);
        }
    }
}

impl Output for DetachedOutput {
    fn open(&mut self) -> Result<(), AudioError> {
        self.opened.set(self.opened.get() + 1);
        Ok(())
    }

    fn connect(&mut self, source: StreamDecoder, volume: f32) -> Result<Sink, AudioError> {
        let (sink, queue) = Sink::new();
        sink.set_volume(volume);
        sink.append(source);
        sink.play();
        self.queues.borrow_mut().push(queue);
        Ok(sink)
    }
}
