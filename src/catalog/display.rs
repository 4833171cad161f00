use super::model::{Track, UNKNOWN};

/// Format seconds as `m:ss` (negative and non-finite values read as zero).
pub fn format_mss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Sample rate in Hz, from the catalog's kHz figure.
pub fn sample_rate_hz(track: &Track) -> Option<u64> {
    track
        .audio_quality
        .as_ref()
        .and_then(|q| q.maximum_sampling_rate)
        .filter(|r| *r > 0.0)
        .map(|khz| (khz * 1000.0).round() as u64)
}

/// Approximate uncompressed bitrate in kbps; `None` unless depth, rate and
/// channel count are all known.
pub fn bitrate_kbps(track: &Track) -> Option<u64> {
    let depth = track
        .audio_quality
        .as_ref()
        .and_then(|q| q.maximum_bit_depth)
        .filter(|d| *d > 0)?;
    let rate = sample_rate_hz(track)?;
    let channels = track.maximum_channel_count.unwrap_or(2);
    if channels == 0 {
        return None;
    }
    Some(rate * u64::from(depth) * u64::from(channels) / 1000)
}

/// `Artist - Title` line used by the now-playing bar and notices.
pub fn now_playing_line(track: &Track) -> String {
    format!("{} - {}", track.title_or_unknown(), track.artist_or_unknown())
}

/// Property/value rows for the track-info popup.
pub fn info_rows(track: &Track) -> Vec<(&'static str, String)> {
    let or_unknown = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    let mut rows = vec![
        ("Title", track.title_or_unknown().to_string()),
        ("Artist", track.artist_or_unknown().to_string()),
        ("Album", track.album_or_unknown().to_string()),
        ("Duration", format_mss(track.duration)),
        ("Release Date", or_unknown(&track.release_date)),
        ("Genre", or_unknown(&track.genre)),
    ];

    if let Some(kbps) = bitrate_kbps(track) {
        rows.push(("Bitrate", format!("{kbps} kbps")));
    }

    let is_hi_res = track.audio_quality.as_ref().is_some_and(|q| q.is_hi_res);
    rows.push(("Format", if is_hi_res { "FLAC" } else { UNKNOWN }.to_string()));
    rows.push((
        "Sample Rate",
        format!("{} Hz", sample_rate_hz(track).unwrap_or(0)),
    ));
    rows.push(("Label", or_unknown(&track.label)));
    rows
}
