use super::types::BackendState;

/// The media decode/output black box the engine drives.
///
/// Implementations must not block for long in any method; slow work (fetching,
/// decoding) belongs on a helper thread, reported through [`BackendState::Opening`].
pub trait MediaBackend: Send {
    /// Replace whatever is loaded with `url`. `expected_duration` (seconds) is
    /// used when the media itself does not report a length.
    fn load(&mut self, url: &str, expected_duration: Option<f64>);

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop and unload.
    fn stop(&mut self);

    /// Jump to `position` seconds.
    fn seek(&mut self, position: f64);

    fn state(&self) -> BackendState;

    /// Seconds since the start of the media.
    fn position(&self) -> f64;

    /// Seconds; 0 when unknown.
    fn duration(&self) -> f64;
}
