use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::CatalogSettings;
use crate::error::CatalogError;

const USER_AGENT: &str = concat!("encore/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client for the catalog API.
pub struct CatalogClient {
    base_url: String,
    page_size: u32,
    http: reqwest::blocking::Client,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| CatalogError::Http {
                endpoint: settings.base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
            http,
        })
    }

    pub(super) fn page_size(&self) -> u32 {
        self.page_size
    }

    /// GET `endpoint` with `params` and decode the JSON body.
    ///
    /// Failures are logged with the endpoint and returned to the caller; there
    /// is no retry.
    pub(super) fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, ?params, "catalog request");

        self.fetch(&url, endpoint, params).inspect_err(|e| {
            tracing::error!(endpoint, error = %e, "catalog request failed");
        })
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let http_err = |source| CatalogError::Http {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(http_err)?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
