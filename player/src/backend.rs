//! The contract between the control overlay and whatever actually decodes and renders video.
//!
//! A backend is a thin capability surface. The overlay tells it to load a source, to pause or
//! resume, to seek, to change volume and to switch presentation modes, and it asks it where
//! playback currently is. In the other direction the backend reports the media duration once it
//! has loaded and then the position at regular intervals while playing; it does so through a
//! [`BackendEvents`] sender handed out by the player session.

use crate::session::PlayerInput;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Where the media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    Remote(String),
    File(PathBuf),
}

impl fmt::Display for MediaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaLocation::Remote(url) => f.write_str(url),
            MediaLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A playable source plus the image to show before the first frame is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub location: MediaLocation,
    pub poster: Option<String>,
}

impl MediaSource {
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            location: MediaLocation::Remote(url.into()),
            poster: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: MediaLocation::File(path.into()),
            poster: None,
        }
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }
}

/// Commands and queries a media backend must support.
///
/// Commands are fire-and-forget: a backend that cannot honor one reports that through its own
/// error surface. Only loading and the position query are asynchronous.
pub trait MediaBackend: Send + Sync + 'static {
    /// Starts loading `source`. Resolves once the backend has accepted it.
    ///
    /// `events` is where the backend reports [`BackendEvent::Loaded`], the progress ticks and the end for
    /// this source; a backend should replace any sender it kept from a previous load.
    fn load(
        &self,
        source: &MediaSource,
        events: BackendEvents,
    ) -> impl Future<Output = eyre::Result<()>> + Send;

    fn set_paused(&self, paused: bool);

    /// Moves playback to `seconds` from the start of the media.
    fn seek(&self, seconds: f64);

    /// Asks the backend where playback is right now.
    fn current_position(&self) -> impl Future<Output = eyre::Result<f64>> + Send;

    /// Sets the output volume, `0.0` for silence and `1.0` for full volume.
    fn set_volume(&self, volume: f32);

    fn set_full_screen(&self, full_screen: bool);

    fn enter_picture_in_picture(&self);
}

/// Callback events a backend emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendEvent {
    /// The media finished loading; emitted once per source.
    Loaded { duration: f64 },
    /// Periodic position update while playing.
    Progress { current_time: f64 },
    /// Playback reached the end of the media and stopped there.
    Ended,
}

/// The channel through which a backend reports [`BackendEvent`]s to its player session.
///
/// Once the session has ended every send is silently dropped, so a backend can keep a copy of
/// this around without risking callbacks into torn-down state.
#[derive(Debug, Clone)]
pub struct BackendEvents {
    tx: mpsc::UnboundedSender<PlayerInput>,
}

impl BackendEvents {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PlayerInput>) -> Self {
        Self { tx }
    }

    pub fn loaded(&self, duration: f64) {
        self.emit(BackendEvent::Loaded { duration });
    }

    pub fn progress(&self, current_time: f64) {
        self.emit(BackendEvent::Progress { current_time });
    }

    pub fn ended(&self) {
        self.emit(BackendEvent::Ended);
    }

    pub fn emit(&self, event: BackendEvent) {
        if self.tx.send(PlayerInput::Backend(event)).is_err() {
            tracing::trace!(?event, "player session is gone; dropping backend event");
        }
    }

    /// Whether the player session is still listening.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}
