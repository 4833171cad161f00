use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::ensure_success;
use crate::config::{ApiSettings, LyricsSettings};
use crate::error::Result;

/// Where raw LRC text comes from.
pub trait LyricsSource: Send + Sync {
    /// Look up lyrics; `Ok(None)` when the source has nothing for the track.
    fn fetch_lyrics(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
        duration: Option<f64>,
    ) -> Result<Option<String>>;
}

/// Client for the public LRCLIB API.
pub struct LrcLibClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LyricsRecord {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    synced_lyrics: Option<String>,
    #[serde(default)]
    plain_lyrics: Option<String>,
}

impl LyricsRecord {
    fn best_text(self) -> Option<String> {
        let non_empty = |s: Option<String>| s.filter(|t| !t.trim().is_empty());
        non_empty(self.synced_lyrics).or_else(|| non_empty(self.plain_lyrics))
    }
}

impl LrcLibClient {
    pub fn new(lyrics: &LyricsSettings, api: &ApiSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs.max(1)))
            .user_agent(api.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: lyrics.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `None` on 404, which LRCLIB uses for "no match".
    fn get_record(&self, path: &str, query: &[(&str, String)]) -> Result<Option<LyricsRecord>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "lyrics request");
        let response = self.http.get(&url).query(query).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(ensure_success(response)?.json()?))
    }

    fn search(&self, artist: &str, title: &str) -> Result<Vec<LyricsRecord>> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, "lyrics search");
        let response = self
            .http
            .get(&url)
            .query(&[("track_name", title), ("artist_name", artist)])
            .send()?;
        Ok(ensure_success(response)?.json()?)
    }
}

impl LyricsSource for LrcLibClient {
    fn fetch_lyrics(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
        duration: Option<f64>,
    ) -> Result<Option<String>> {
        if artist.trim().is_empty() || title.trim().is_empty() {
            return Ok(None);
        }

        let record = if album.is_some() || duration.is_some() {
            let mut query = vec![
                ("track_name", title.to_string()),
                ("artist_name", artist.to_string()),
            ];
            if let Some(album) = album {
                query.push(("album_name", album.to_string()));
            }
            if let Some(duration) = duration {
                query.push(("duration", format!("{}", duration.round() as u64)));
            }
            self.get_record("/get", &query)?
        } else {
            match self.search(artist, title)?.into_iter().find_map(|r| r.id) {
                Some(id) => self.get_record(&format!("/get/{id}"), &[])?,
                None => None,
            }
        };

        Ok(record.and_then(LyricsRecord::best_text))
    }
}
