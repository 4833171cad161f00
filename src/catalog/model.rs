use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const UNKNOWN: &str = "Unknown";

/// Track metadata as returned by the catalog.
///
/// Identity is `id`; everything else is informational. Fields this type does
/// not model are kept in `extra` so playlists round-trip the full record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_title: Option<String>,
    /// Length in seconds; 0 when the catalog did not say.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_quality: Option<AudioQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_channel_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Resolved streaming URL, attached right before playback.
    #[serde(default, rename = "stream_url", skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioQuality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_bit_depth: Option<u32>,
    /// Sampling rate in kHz (e.g. `96.0`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_sampling_rate: Option<f64>,
    #[serde(default)]
    pub is_hi_res: bool,
}

impl Track {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            artist: Some(artist.into()),
            ..Self::default()
        }
    }

    /// Same identifier, regardless of the other fields.
    pub fn same_track(&self, other: &Track) -> bool {
        self.id == other.id
    }

    pub fn title_or_unknown(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn artist_or_unknown(&self) -> &str {
        non_blank(self.artist.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn album_or_unknown(&self) -> &str {
        non_blank(self.album_title.as_deref()).unwrap_or(UNKNOWN)
    }

    /// Catalog duration, if one was reported.
    pub fn length(&self) -> Option<Duration> {
        (self.duration.is_finite() && self.duration > 0.0)
            .then(|| Duration::from_secs_f64(self.duration))
    }

    /// Overlay the fields a detail record carries (best-effort enrichment).
    pub fn merge_detail(&mut self, detail: Track) {
        let Track {
            id: _,
            title,
            artist,
            album_title,
            duration,
            audio_quality,
            maximum_channel_count,
            label,
            release_date,
            genre,
            stream_url: _,
            extra,
        } = detail;

        overlay(&mut self.title, title);
        overlay(&mut self.artist, artist);
        overlay(&mut self.album_title, album_title);
        overlay(&mut self.audio_quality, audio_quality);
        overlay(&mut self.maximum_channel_count, maximum_channel_count);
        overlay(&mut self.label, label);
        overlay(&mut self.release_date, release_date);
        overlay(&mut self.genre, genre);
        if duration > 0.0 {
            self.duration = duration;
        }
        self.extra.extend(extra);
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_seconds<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<f64, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// What a catalog search looks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Track,
    Album,
}

impl SearchKind {
    /// Value of the `type` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SearchKind::Track => "track",
            SearchKind::Album => "album",
        }
    }

    /// Key holding the item list in a search response.
    pub fn items_key(self) -> &'static str {
        match self {
            SearchKind::Track => "tracks",
            SearchKind::Album => "albums",
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<Track>,
    /// Total number of items across all pages.
    pub total: usize,
    /// Page size the server used, if it said.
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pagination {
    total: usize,
    limit: Option<usize>,
}

impl SearchPage {
    /// Parse a raw `/search` response body.
    ///
    /// Items that do not look like objects are skipped rather than failing the page.
    pub fn from_json(mut body: Value, kind: SearchKind) -> Result<Self> {
        let Some(obj) = body.as_object_mut() else {
            return Err(Error::InvalidInput("search response is not an object".into()));
        };

        let items = match obj.remove(kind.items_key()) {
            Some(Value::Array(raw)) => raw
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|v| serde_json::from_value::<Track>(v).ok())
                .collect(),
            _ => Vec::new(),
        };

        let pagination: Pagination = obj
            .remove("pagination")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Ok(Self {
            items,
            total: pagination.total,
            limit: pagination.limit,
        })
    }
}
