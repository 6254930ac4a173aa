use serde::{Deserialize, Serialize};

/// One playable song as produced by the catalog.
///
/// `duration_seconds` is only a hint until the audio engine reports the
/// real duration. `audio_url` is empty for search results that have not
/// been resolved through a detail lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album_name: String,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub audio_url: String,
}

impl Track {
    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{artist} - {}", self.title)
        }
    }

    pub fn is_playable(&self) -> bool {
        !self.audio_url.trim().is_empty()
    }
}
