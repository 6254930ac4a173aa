//! Audio engine adapter.
//!
//! A dedicated thread owns the output device and at most one `rodio` sink.
//! Callers talk to it through `AudioPlayer`, which implements `AudioEngine`;
//! progress and completion flow back as `AudioEvent`s on a channel.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioEngine, AudioEvent};

#[cfg(test)]
mod fake;
#[cfg(test)]
pub(crate) use fake::{Call, RecordingEngine};
