//! Wire types shared by the search and song endpoints.

use serde::Deserialize;

use super::model::Track;

pub(super) const UNKNOWN_ARTIST: &str = "Unknown Artist";
const PREFERRED_IMAGE_QUALITY: &str = "500x500";
const PREFERRED_AUDIO_QUALITY: &str = "320kbps";

/// A quality-tagged link. Older payloads name the field `link`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ApiLink {
    #[serde(default)]
    pub quality: String,
    #[serde(default, alias = "link")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiArtists {
    #[serde(default)]
    pub primary: Vec<ApiArtist>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiAlbum {
    #[serde(default)]
    pub name: Option<String>,
}

/// Durations arrive either as a number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum ApiDuration {
    Seconds(f64),
    Text(String),
}

impl ApiDuration {
    pub fn seconds(&self) -> u32 {
        let raw = match self {
            ApiDuration::Seconds(v) => *v,
            ApiDuration::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if raw.is_finite() && raw > 0.0 {
            raw.min(u32::MAX as f64) as u32
        } else {
            0
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiSong {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album: Option<ApiAlbum>,
    #[serde(default)]
    pub artists: Option<ApiArtists>,
    #[serde(default)]
    pub duration: Option<ApiDuration>,
    #[serde(default)]
    pub image: Vec<ApiLink>,
    #[serde(default, rename = "downloadUrl")]
    pub download_url: Vec<ApiLink>,
}

impl ApiSong {
    pub fn into_track(self) -> Track {
        let audio_url = pick_audio_url(&self.download_url).unwrap_or_default();
        Track {
            artist: artist_display(self.artists.as_ref()),
            album_name: self.album.and_then(|a| a.name).unwrap_or_default(),
            duration_seconds: self.duration.as_ref().map_or(0, ApiDuration::seconds),
            image_url: pick_image_url(&self.image),
            audio_url,
            title: self.name,
            id: self.id,
        }
    }
}

/// Comma-joined primary artists, or "Unknown Artist" if there are none.
pub(super) fn artist_display(artists: Option<&ApiArtists>) -> String {
    let names: Vec<&str> = artists
        .map(|a| {
            a.primary
                .iter()
                .map(|p| p.name.trim())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        names.join(", ")
    }
}

/// The "500x500" variant, else the last one listed, else empty.
pub(super) fn pick_image_url(images: &[ApiLink]) -> String {
    images
        .iter()
        .find(|img| img.quality == PREFERRED_IMAGE_QUALITY)
        .or_else(|| images.last())
        .map(|img| img.url.clone())
        .unwrap_or_default()
}

/// The "320kbps" variant if it has a URL, else the last variant with a
/// non-empty URL. `None` means nothing is streamable.
pub(super) fn pick_audio_url(variants: &[ApiLink]) -> Option<String> {
    variants
        .iter()
        .find(|v| v.quality == PREFERRED_AUDIO_QUALITY && !v.url.trim().is_empty())
        .or_else(|| variants.iter().rev().find(|v| !v.url.trim().is_empty()))
        .map(|v| v.url.trim().to_string())
}
