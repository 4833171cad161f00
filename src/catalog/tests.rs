use super::*;
use crate::error::{Error, Result};
use serde_json::json;
use std::sync::Mutex;

fn t(id: &str) -> Track {
    Track::new(id, format!("Title {id}"), "Artist")
}

/// Serves canned pages keyed by offset (`None` fails); records every requested offset.
struct PagedCatalog {
    pages: Vec<(usize, Option<SearchPage>)>,
    seen: Mutex<Vec<usize>>,
}

impl PagedCatalog {
    fn new(pages: Vec<(usize, Option<SearchPage>)>) -> Self {
        Self {
            pages,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn offsets(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

impl Catalog for PagedCatalog {
    fn search(&self, _query: &str, _kind: SearchKind, offset: usize) -> Result<SearchPage> {
        self.seen.lock().unwrap().push(offset);
        match self.pages.iter().find(|(o, _)| *o == offset) {
            Some((_, Some(page))) => Ok(page.clone()),
            Some((_, None)) => Err(Error::Status {
                status: 503,
                url: "http://catalog/search".into(),
            }),
            None => Ok(SearchPage::default()),
        }
    }

    fn resolve(&self, _track_id: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn detail(&self, _track_id: &str) -> Result<Option<Track>> {
        Ok(None)
    }
}

fn page(ids: &[&str], total: usize, limit: Option<usize>) -> SearchPage {
    SearchPage {
        items: ids.iter().map(|id| t(id)).collect(),
        total,
        limit,
    }
}

#[test]
fn fetch_all_accumulates_until_offset_reaches_total() {
    let catalog = PagedCatalog::new(vec![
        (0, Some(page(&["1", "2"], 5, Some(2)))),
        (2, Some(page(&["3", "4"], 5, Some(2)))),
        (4, Some(page(&["5"], 5, Some(2)))),
    ]);

    let all = fetch_all(&catalog, "q", SearchKind::Track);
    let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(catalog.offsets(), vec![0, 2, 4]);
}

#[test]
fn fetch_all_stops_on_empty_page() {
    let catalog = PagedCatalog::new(vec![(0, Some(page(&["1", "2"], 100, Some(2))))]);

    let all = fetch_all(&catalog, "q", SearchKind::Track);
    assert_eq!(all.len(), 2);
    assert_eq!(catalog.offsets(), vec![0, 2]);
}

#[test]
fn fetch_all_treats_failure_as_no_more_pages() {
    let catalog = PagedCatalog::new(vec![
        (0, Some(page(&["1", "2"], 6, Some(2)))),
        (2, None),
        (4, Some(page(&["5", "6"], 6, Some(2)))),
    ]);

    let all = fetch_all(&catalog, "q", SearchKind::Track);
    assert_eq!(all.len(), 2);
    assert_eq!(catalog.offsets(), vec![0, 2]);
}

#[test]
fn fetch_all_uses_page_length_when_limit_missing_or_zero() {
    let catalog = PagedCatalog::new(vec![
        (0, Some(page(&["1", "2", "3"], 4, None))),
        (3, Some(page(&["4"], 4, Some(0)))),
    ]);

    let all = fetch_all(&catalog, "q", SearchKind::Track);
    assert_eq!(all.len(), 4);
    assert_eq!(catalog.offsets(), vec![0, 3]);
}

#[test]
fn search_page_parses_numeric_ids_and_pagination() {
    let body = json!({
        "tracks": [
            {"id": 123, "title": "Song", "artist": "Band", "albumTitle": "LP", "duration": 215},
            "garbage",
            {"id": "abc", "title": "Other"}
        ],
        "pagination": {"total": 40, "limit": 10}
    });

    let page = SearchPage::from_json(body, SearchKind::Track).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "123");
    assert_eq!(page.items[0].album_title.as_deref(), Some("LP"));
    assert_eq!(page.items[0].duration, 215.0);
    assert_eq!(page.items[1].id, "abc");
    assert_eq!(page.total, 40);
    assert_eq!(page.limit, Some(10));
}

#[test]
fn search_page_reads_the_key_for_its_kind() {
    let body = json!({
        "tracks": [{"id": 1}],
        "albums": [{"id": 2, "title": "Album"}, {"id": 3, "title": "Album 2"}]
    });

    let page = SearchPage::from_json(body, SearchKind::Album).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 0);
    assert_eq!(page.limit, None);
}

#[test]
fn track_json_keeps_unknown_fields() {
    let raw = json!({
        "id": 77,
        "title": "Song",
        "artist": "Band",
        "duration": null,
        "audioQuality": {"maximumBitDepth": 24, "maximumSamplingRate": 96.0, "isHiRes": true},
        "albumCover": "https://img/cover.jpg",
        "explicit": false
    });

    let track: Track = serde_json::from_value(raw).unwrap();
    assert_eq!(track.id, "77");
    assert_eq!(track.duration, 0.0);
    assert_eq!(track.extra.get("albumCover"), Some(&json!("https://img/cover.jpg")));

    let encoded = serde_json::to_string(&track).unwrap();
    let decoded: Track = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, track);
}

#[test]
fn missing_metadata_reads_as_unknown() {
    let track = Track {
        id: "1".into(),
        title: Some("   ".into()),
        ..Track::default()
    };
    assert_eq!(track.title_or_unknown(), "Unknown");
    assert_eq!(track.artist_or_unknown(), "Unknown");
    assert_eq!(track.album_or_unknown(), "Unknown");
    assert_eq!(track.length(), None);
}

#[test]
fn merge_detail_overlays_present_fields_only() {
    let mut track = t("9");
    track.album_title = Some("Original".into());
    track.duration = 100.0;

    let detail = Track {
        id: "ignored".into(),
        genre: Some("Jazz".into()),
        label: Some("Blue Note".into()),
        duration: 0.0,
        ..Track::default()
    };
    track.merge_detail(detail);

    assert_eq!(track.id, "9");
    assert_eq!(track.album_title.as_deref(), Some("Original"));
    assert_eq!(track.genre.as_deref(), Some("Jazz"));
    assert_eq!(track.label.as_deref(), Some("Blue Note"));
    assert_eq!(track.duration, 100.0);
}

#[test]
fn format_mss_pads_seconds() {
    assert_eq!(format_mss(0.0), "0:00");
    assert_eq!(format_mss(65.9), "1:05");
    assert_eq!(format_mss(3600.0), "60:00");
    assert_eq!(format_mss(-3.0), "0:00");
    assert_eq!(format_mss(f64::NAN), "0:00");
}

#[test]
fn info_rows_compute_bitrate_and_format() {
    let mut track = t("1");
    track.audio_quality = Some(AudioQuality {
        maximum_bit_depth: Some(24),
        maximum_sampling_rate: Some(96.0),
        is_hi_res: true,
    });

    assert_eq!(sample_rate_hz(&track), Some(96_000));
    // channel count defaults to stereo
    assert_eq!(bitrate_kbps(&track), Some(4608));

    let rows = info_rows(&track);
    let get = |k: &str| rows.iter().find(|(n, _)| *n == k).map(|(_, v)| v.clone());
    assert_eq!(get("Bitrate").as_deref(), Some("4608 kbps"));
    assert_eq!(get("Format").as_deref(), Some("FLAC"));
    assert_eq!(get("Sample Rate").as_deref(), Some("96000 Hz"));
    assert_eq!(get("Genre").as_deref(), Some("Unknown"));
}

#[test]
fn info_rows_omit_bitrate_when_quality_unknown() {
    let rows = info_rows(&t("1"));
    assert!(rows.iter().all(|(k, _)| *k != "Bitrate"));
    assert!(rows.contains(&("Format", "Unknown".to_string())));
}

fn client(base_url: &str) -> DabClient {
    let settings = crate::config::ApiSettings {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    DabClient::new(&settings).unwrap()
}

#[test]
fn track_ids_stay_one_escaped_path_segment() {
    let client = client("http://catalog.test/api");
    let url = client.endpoint(&["track", "12/../x y?z#w"]).unwrap();
    assert_eq!(url.as_str(), "http://catalog.test/api/track/12%2F..%2Fx%20y%3Fz%23w");
    assert_eq!(url.query(), None);
    assert_eq!(url.path_segments().unwrap().count(), 3);
}

#[test]
fn base_url_trailing_slash_is_ignored() {
    let url = client("http://catalog.test/api/").endpoint(&["search"]).unwrap();
    assert_eq!(url.as_str(), "http://catalog.test/api/search");
}

#[test]
fn unparseable_base_url_is_a_config_error() {
    let settings = crate::config::ApiSettings {
        base_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(matches!(DabClient::new(&settings), Err(Error::Config(_))));
}
