//! Transport controls: play/pause and the skip buttons.

use std::fmt;

/// How far the skip buttons jump, in seconds.
pub const SKIP_OFFSET_SECS: f64 = 5.0;

/// Whether the backend is decoding and rendering.
///
/// There is no buffering or loading state; whatever the backend does while it fetches data is
/// invisible at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    Playing,
    #[default]
    Paused,
}

impl TransportState {
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            TransportState::Paused
        } else {
            TransportState::Playing
        }
    }

    pub fn is_paused(self) -> bool {
        self == TransportState::Paused
    }

    /// The state a tap on the play/pause button leads to.
    pub fn toggled(self) -> Self {
        match self {
            TransportState::Playing => TransportState::Paused,
            TransportState::Paused => TransportState::Playing,
        }
    }

    /// Name of the icon the play/pause button shows in this state.
    pub fn button_icon(self) -> &'static str {
        match self {
            TransportState::Playing => "pause",
            TransportState::Paused => "play",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Playing => f.write_str("playing"),
            TransportState::Paused => f.write_str("paused"),
        }
    }
}

/// Direction of a skip button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Forward,
    Backward,
}

impl SkipDirection {
    /// Signed offset in seconds.
    pub fn offset(self) -> f64 {
        match self {
            SkipDirection::Forward => SKIP_OFFSET_SECS,
            SkipDirection::Backward => -SKIP_OFFSET_SECS,
        }
    }
}

/// Computes where a skip from `position` lands.
///
/// The result never goes below `0`, and never past `duration` once a duration is known.
pub fn skip_target(position: f64, direction: SkipDirection, duration: f64) -> f64 {
    let target = (position + direction.offset()).max(0.0);
    if duration.is_finite() && duration > 0.0 {
        target.min(duration)
    } else {
        target
    }
}
