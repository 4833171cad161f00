/// One timed lyric line.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track.
    pub timestamp: f64,
    pub text: String,
}

/// Parse LRC text into lines sorted by timestamp.
///
/// A line must start with `[m:ss.xx]`; anything else (metadata tags such as
/// `[ar:...]`, plain text, broken stamps) is skipped.
pub fn parse_lrc(raw: &str) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = raw.lines().filter_map(parse_line).collect();
    lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    lines
}

fn parse_line(line: &str) -> Option<LyricLine> {
    let rest = line.strip_prefix('[')?;
    let (stamp, text) = rest.split_once(']')?;
    let (minutes, seconds) = stamp.split_once(':')?;

    let (whole, fraction) = seconds.split_once('.')?;
    if !all_digits(minutes) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    Some(LyricLine {
        timestamp: minutes as f64 * 60.0 + seconds,
        text: text.trim().to_string(),
    })
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
