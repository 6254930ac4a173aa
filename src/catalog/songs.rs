use serde::Deserialize;

use crate::error::CatalogError;

use super::client::CatalogClient;
use super::model::Track;
use super::wire::ApiSong;

#[derive(Debug, Deserialize)]
pub(super) struct SongResponse {
    #[serde(default)]
    pub data: Vec<ApiSong>,
}

/// Take the first entry of a detail response and require a playable URL.
pub(super) fn shape_song(id: &str, response: SongResponse) -> Result<Track, CatalogError> {
    let song = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

    let track = song.into_track();
    if !track.is_playable() {
        return Err(CatalogError::NoPlayableAudio(track.id));
    }
    Ok(track)
}

impl CatalogClient {
    pub fn song_by_id(&self, id: &str) -> Result<Track, CatalogError> {
        let endpoint = format!("/api/songs/{id}");
        let response: SongResponse = self.get_json(&endpoint, &[])?;
        let track = shape_song(id, response).inspect_err(|e| {
            tracing::warn!(id, error = %e, "song lookup returned nothing playable");
        })?;
        tracing::debug!(id, title = %track.title, "resolved song");
        Ok(track)
    }
}
