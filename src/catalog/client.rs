//! HTTP client for the remote catalog.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiSettings;
use crate::error::{Error, Result};

use super::model::{SearchKind, SearchPage, Track};

/// The catalog operations the player needs.
///
/// Calls block; the player only makes them from one-shot worker threads.
pub trait Catalog: Send + Sync {
    fn search(&self, query: &str, kind: SearchKind, offset: usize) -> Result<SearchPage>;

    /// Streaming URL for `track_id`, or `None` when the catalog has none.
    fn resolve(&self, track_id: &str) -> Result<Option<String>>;

    /// Extended metadata for `track_id`, or `None` when unknown.
    fn detail(&self, track_id: &str) -> Result<Option<Track>>;
}

/// Client for the DAB catalog API.
pub struct DabClient {
    http: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    url: Option<String>,
}

impl DabClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(settings.user_agent.clone())
            .build()?;
        let base_url = Url::parse(settings.base_url.trim())
            .map_err(|e| Error::Config(format!("api.base_url: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// `base_url` with `segments` appended, each escaped as one path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("api.base_url cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Response> {
        let url = self.endpoint(segments)?;
        debug!(%url, "catalog request");
        let response = self.http.get(url).query(query).send()?;
        Ok(response)
    }
}

/// Turn a non-2xx response into [`Error::Status`].
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

impl Catalog for DabClient {
    fn search(&self, query: &str, kind: SearchKind, offset: usize) -> Result<SearchPage> {
        let response = self.get(
            &["search"],
            &[
                ("q", query.to_string()),
                ("offset", offset.to_string()),
                ("type", kind.as_param().to_string()),
            ],
        )?;
        let body: Value = ensure_success(response)?.json()?;
        SearchPage::from_json(body, kind)
    }

    fn resolve(&self, track_id: &str) -> Result<Option<String>> {
        let response = self.get(&["stream"], &[("trackId", track_id.to_string())])?;
        let body: StreamResponse = ensure_success(response)?.json()?;
        Ok(body.url.filter(|u| !u.trim().is_empty()))
    }

    fn detail(&self, track_id: &str) -> Result<Option<Track>> {
        let response = self.get(&["track", track_id], &[])?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let track: Track = ensure_success(response)?.json()?;
        Ok(Some(track))
    }
}
