use serde::Deserialize;

use crate::error::CatalogError;

use super::client::CatalogClient;
use super::model::Track;
use super::wire::ApiSong;

const SEARCH_ENDPOINT: &str = "/api/search/songs";

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub tracks: Vec<Track>,
    /// Total matches across all pages, as reported by the catalog.
    pub total_matches: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    pub data: SearchData,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchData {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub results: Vec<ApiSong>,
}

pub(super) fn shape_search(response: SearchResponse) -> SearchPage {
    SearchPage {
        total_matches: response.data.total,
        tracks: response
            .data
            .results
            .into_iter()
            .map(ApiSong::into_track)
            .collect(),
    }
}

impl CatalogClient {
    pub fn search_songs(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let params = [
            ("query", query.to_string()),
            ("page", page.max(1).to_string()),
            ("limit", self.page_size().to_string()),
        ];
        let response: SearchResponse = self.get_json(SEARCH_ENDPOINT, &params)?;
        let page = shape_search(response);
        tracing::info!(
            query,
            results = page.tracks.len(),
            total = page.total_matches,
            "search complete"
        );
        Ok(page)
    }
}
