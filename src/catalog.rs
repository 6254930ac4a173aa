//! Remote song catalog: search and song-detail lookup.
//!
//! The HTTP client lives in `catalog::client`; response shaping into
//! `Track` values lives next to each endpoint so it can be tested from
//! JSON fixtures without touching the network.

mod client;
mod model;
mod search;
mod songs;
mod wire;

pub use client::CatalogClient;
pub use model::Track;
pub use search::SearchPage;

use crate::error::CatalogError;

/// Read-only view of the catalog used by the console.
pub trait Catalog {
    /// Search songs by free text. `page` is 1-based.
    fn search(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError>;
    /// Resolve one song, including a streamable audio URL.
    fn track(&self, id: &str) -> Result<Track, CatalogError>;
}

impl Catalog for CatalogClient {
    fn search(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        self.search_songs(query, page)
    }

    fn track(&self, id: &str) -> Result<Track, CatalogError> {
        self.song_by_id(id)
    }
}
