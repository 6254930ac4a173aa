//! Utilities for turning a stream URL into a playing `rodio` sink.
//!
//! Fetching and decoding happen before the output device is touched, so a
//! bad URL or a corrupt stream never disturbs the current output.

use std::fs;
use std::io::{Cursor, Read};
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::types::LoadRequest;

pub(super) type StreamDecoder = Decoder<Cursor<Vec<u8>>>;

/// Where decoded tracks end up playing.
pub(super) trait Output {
    /// Make sure the output is ready. Calling it again is cheap.
    fn open(&mut self) -> Result<(), AudioError>;
    /// Start `source` on a new sink.
    fn connect(&mut self, source: StreamDecoder, volume: f32) -> Result<Sink, AudioError>;
}

/// The default output device, opened on first use.
#[derive(Default)]
pub(super) struct DeviceOutput {
    stream: Option<OutputStream>,
}

impl DeviceOutput {
    fn stream(&mut self) -> Result<&OutputStream, AudioError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::Device(e.to_string()))?;
            // rodio logs to stderr when OutputStream is dropped, which would
            // garble the console.
            stream.log_on_drop(false);
            tracing::info!("audio output opened");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| AudioError::Device("output stream missing".into()))
    }
}

impl Output for DeviceOutput {
    fn open(&mut self) -> Result<(), AudioError> {
        self.stream().map(|_| ())
    }

    fn connect(&mut self, source: StreamDecoder, volume: f32) -> Result<Sink, AudioError> {
        let stream = self.stream()?;
        Ok(create_sink(stream, source, volume))
    }
}

/// HTTP client for stream downloads.
///
/// reqwest's blocking timeout bounds each read of the body rather than the
/// whole transfer, so it acts as a stall limit and long tracks still arrive
/// over slow links.
pub(super) fn stream_client(settings: &AudioSettings) -> Result<Client, AudioError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.stall_timeout_secs))
        .build()
        .map_err(|e| AudioError::Fetch {
            url: String::new(),
            reason: e.to_string(),
        })
}

/// Download the whole stream. `file://` URLs and bare paths read from disk.
pub(super) fn fetch_stream(http: &Client, url: &str) -> Result<Vec<u8>, AudioError> {
    let fetch_err = |reason: String| AudioError::Fetch {
        url: url.to_string(),
        reason,
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        let path = url.strip_prefix("file://").unwrap_or(url);
        return fs::read(path).map_err(|e| fetch_err(e.to_string()));
    }

    let mut response = http
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| fetch_err(e.to_string()))?;

    let mut body = Vec::new();
    response
        .read_to_end(&mut body)
        .map_err(|e| fetch_err(e.to_string()))?;
    Ok(body)
}

/// Decode `bytes`, returning the source and its duration when known.
pub(super) fn decode(req: &LoadRequest, bytes: Vec<u8>) -> Result<(StreamDecoder, Duration), AudioError> {
    let source = Decoder::new(Cursor::new(bytes)).map_err(|source| AudioError::Decode {
        id: req.id.clone(),
        source,
    })?;
    let duration = source.total_duration().unwrap_or(Duration::ZERO);
    Ok((source, duration))
}

/// Create a playing `Sink` for `source` on `stream`.
fn create_sink(stream: &OutputStream, source: StreamDecoder, volume: f32) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.play();
    sink
}
