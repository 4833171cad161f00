use crate::catalog::format_mss;
use crate::player::PlayerState;

/// Text for the bottom progress bar, sized for a row `width` columns wide:
/// `▕███░░░▏ 1:05 / 3:20 (Playing)`.
pub fn progress_line(position: f64, duration: f64, state: PlayerState, width: u16) -> String {
    let (position, duration) = match state {
        PlayerState::Idle => (0.0, 0.0),
        _ => (position, duration),
    };
    // Room for the time text after the bar.
    let bar_width = usize::from(width).saturating_sub(20).max(10);
    let fraction = if duration > 0.0 && position.is_finite() {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (bar_width as f64 * fraction) as usize;

    format!(
        "▕{}{}▏ {} / {} ({})",
        "█".repeat(filled),
        "░".repeat(bar_width - filled),
        format_mss(position),
        format_mss(duration),
        state.label()
    )
}
