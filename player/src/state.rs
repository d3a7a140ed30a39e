//! Playback state owned by the control overlay.
//!
//! Nothing in here talks to a media backend. [`PlaybackState`] is plain data that the
//! [`crate::overlay::ControlOverlay`] mutates in response to user input and backend callbacks,
//! and that renderers read back (through [`PlaybackSnapshot`]) to draw the scrub bar and the
//! time label.

/// Volume handed to the backend while unmuted.
pub const FULL_VOLUME: f32 = 1.0;

/// Volume handed to the backend while muted.
pub const SILENT_VOLUME: f32 = 0.0;

/// Transport, mute and fullscreen flags together with the playback clock.
///
/// A fresh state is paused, unmuted, windowed, and has neither a position nor a duration: the
/// duration stays at `0` until the backend reports that the media has loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    paused: bool,
    muted: bool,
    full_screen: bool,
    current_time: f64,
    duration: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            paused: true,
            muted: false,
            full_screen: false,
            current_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn full_screen(&self) -> bool {
        self.full_screen
    }

    /// Current playback position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Media duration in seconds, or `0` if nothing has loaded yet.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether the backend has reported a usable duration.
    pub fn is_loaded(&self) -> bool {
        self.duration > 0.0
    }

    /// The volume level implied by the mute flag.
    pub fn volume(&self) -> f32 {
        if self.muted { SILENT_VOLUME } else { FULL_VOLUME }
    }

    /// Flips the paused flag and returns the new value.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flips the muted flag and returns the new value.
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Flips the fullscreen flag and returns the new value.
    pub fn toggle_full_screen(&mut self) -> bool {
        self.full_screen = !self.full_screen;
        self.full_screen
    }

    /// Records the duration reported by the backend.
    ///
    /// Negative and non-finite durations are treated as "unknown". The current position is
    /// re-clamped so it never ends up past the new end of the media.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        self.current_time = self.clamp_time(self.current_time);
    }

    /// Overwrites the playback position, clamped into `[0, duration]`.
    ///
    /// Non-finite positions are ignored.
    pub fn set_current_time(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            tracing::trace!(seconds, "ignoring non-finite playback position");
            return;
        }
        self.current_time = self.clamp_time(seconds);
    }

    /// Clamps a position into the playable range.
    ///
    /// Before the duration is known only the lower bound applies.
    pub fn clamp_time(&self, seconds: f64) -> f64 {
        if self.is_loaded() {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        }
    }

    /// How far playback has progressed, always within `[0, 1]`.
    ///
    /// Backends occasionally report a position a hair past the duration; that still reads as `1`.
    pub fn progress_fraction(&self) -> f64 {
        if !self.is_loaded() {
            return 0.0;
        }
        (self.current_time / self.duration).clamp(0.0, 1.0)
    }

    /// The `"current/total"` label shown in the corner of the overlay.
    pub fn progress_label(&self) -> String {
        format!(
            "{}/{}",
            format_clock(self.current_time),
            format_clock(self.duration)
        )
    }
}

/// Width of the scrub track as laid out on screen.
///
/// The width is `0` until the first layout pass has measured the track; seeking is not possible
/// before that.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrubGeometry {
    track_width_px: f64,
}

impl ScrubGeometry {
    pub fn new(track_width_px: f64) -> Self {
        let mut geometry = Self::default();
        geometry.resize(track_width_px);
        geometry
    }

    pub fn track_width_px(&self) -> f64 {
        self.track_width_px
    }

    pub fn is_measured(&self) -> bool {
        self.track_width_px > 0.0
    }

    /// Applies a layout or resize measurement.
    pub fn resize(&mut self, track_width_px: f64) {
        self.track_width_px = if track_width_px.is_finite() && track_width_px > 0.0 {
            track_width_px
        } else {
            0.0
        };
    }
}

/// Everything a renderer needs to draw the overlay for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub paused: bool,
    pub muted: bool,
    pub full_screen: bool,
    pub scrubbing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub progress_fraction: f64,
    pub label: String,
}

impl PlaybackSnapshot {
    pub(crate) fn capture(state: &PlaybackState, scrubbing: bool) -> Self {
        Self {
            paused: state.paused(),
            muted: state.muted(),
            full_screen: state.full_screen(),
            scrubbing,
            current_time: state.current_time(),
            duration: state.duration(),
            progress_fraction: state.progress_fraction(),
            label: state.progress_label(),
        }
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::capture(&PlaybackState::new(), false)
    }
}

/// Formats a number of seconds as `m:ss`, or `h:mm:ss` from one hour on.
///
/// Seconds are rounded to the nearest whole second first. Negative and non-finite inputs render
/// as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn starts_paused_and_unloaded() {
        let state = PlaybackState::new();
        assert!(state.paused());
        assert!(!state.muted());
        assert!(!state.full_screen());
        assert!(!state.is_loaded());
        assert_eq!(state.current_time(), 0.0);
        assert_eq!(state.progress_fraction(), 0.0);
        assert_eq!(state.progress_label(), "0:00/0:00");
    }

    #[test]
    fn double_toggles_restore_flags() {
        let mut state = PlaybackState::new();
        assert!(!state.toggle_paused());
        assert!(state.toggle_paused());
        assert!(state.paused());

        assert!(state.toggle_muted());
        assert_eq!(state.volume(), SILENT_VOLUME);
        assert!(!state.toggle_muted());
        assert_eq!(state.volume(), FULL_VOLUME);
    }

    #[test]
    fn progress_fraction_from_tick() {
        let mut state = PlaybackState::new();
        state.set_duration(120.0);
        state.set_current_time(45.0);
        assert_approx_eq!(f64, state.progress_fraction(), 0.375, epsilon = 1e-9);
    }

    #[test]
    fn position_is_clamped_to_duration() {
        let mut state = PlaybackState::new();
        state.set_duration(60.0);
        state.set_current_time(60.000_4);
        assert_eq!(state.current_time(), 60.0);
        assert_eq!(state.progress_fraction(), 1.0);

        state.set_current_time(-3.0);
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn unloaded_state_only_clamps_below() {
        let mut state = PlaybackState::new();
        state.set_current_time(12.5);
        assert_eq!(state.current_time(), 12.5);
        assert_eq!(state.progress_fraction(), 0.0);

        // a shorter duration pulls the position back in range
        state.set_duration(10.0);
        assert_eq!(state.current_time(), 10.0);
    }

    #[test]
    fn bogus_inputs_are_ignored() {
        let mut state = PlaybackState::new();
        state.set_duration(f64::NAN);
        assert!(!state.is_loaded());
        state.set_duration(30.0);
        state.set_current_time(10.0);
        state.set_current_time(f64::INFINITY);
        assert_eq!(state.current_time(), 10.0);
    }

    #[test]
    fn geometry_rejects_unmeasured_widths() {
        assert!(!ScrubGeometry::default().is_measured());
        assert!(!ScrubGeometry::new(-4.0).is_measured());
        assert!(!ScrubGeometry::new(f64::NAN).is_measured());
        let mut geometry = ScrubGeometry::new(320.0);
        assert_eq!(geometry.track_width_px(), 320.0);
        geometry.resize(0.0);
        assert!(!geometry.is_measured());
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(4.4), "0:04");
        assert_eq!(format_clock(59.6), "1:00");
        assert_eq!(format_clock(128.0), "2:08");
        assert_eq!(format_clock(717.0), "11:57");
        assert_eq!(format_clock(3725.0), "1:02:05");
        assert_eq!(format_clock(-1.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut state = PlaybackState::new();
        state.set_duration(120.0);
        state.set_current_time(45.0);
        state.toggle_paused();
        let snapshot = PlaybackSnapshot::capture(&state, true);
        assert!(!snapshot.paused);
        assert!(snapshot.scrubbing);
        assert_eq!(snapshot.label, "0:45/2:00");
        assert_approx_eq!(f64, snapshot.progress_fraction, 0.375, epsilon = 1e-9);
    }
}
