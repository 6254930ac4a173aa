//! Error types for the catalog and audio layers.
//!
//! Foreground lookups surface `CatalogError` to the caller. `AudioError` is
//! logged and swallowed by the reconciliation path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("song not found for id {0}")]
    NotFound(String),

    /// The detail lookup succeeded but no variant carried a usable stream URL.
    #[error("no playable audio for song {0}")]
    NoPlayableAudio(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("track {0} has no audio url")]
    MissingAudioUrl(String),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to decode stream for track {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("audio output unavailable: {0}")]
    Device(String),

    #[error("audio thread is not running")]
    Disconnected,
}

/// A console line that could not be turned into a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("`{0}` is not a valid position (numbers start at 1)")]
    InvalidNumber(String),
}
