//! Playback controls for tubeview's video screen.
//!
//! This crate is the part of the player that sits between the person tapping the screen and the
//! component that actually decodes video. It knows about play/pause, mute, fullscreen, skipping,
//! and turning a touch on the scrub bar into a seek; it does not know how to decode anything.
//! Decoding and rendering live behind the [`MediaBackend`] trait.
//!
//! The pieces, from the bottom up:
//!
//! - [`state`]: the playback clock and flags, plus the derived progress fraction and label.
//! - [`scrub`]: the touch-offset to media-time mapping.
//! - [`transport`]: the playing/paused state machine and the skip arithmetic.
//! - [`overlay`]: a synchronous state machine combining the above, turning inputs into
//!   backend [`overlay::Command`]s.
//! - [`session`]: a tokio event loop that runs an overlay against a real backend.
//! - [`orientation`]: unlocking rotation for the lifetime of the video screen.

pub mod backend;
pub mod orientation;
pub mod overlay;
pub mod scrub;
pub mod session;
pub mod state;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{BackendEvent, BackendEvents, MediaBackend, MediaLocation, MediaSource};
pub use orientation::{Orientation, OrientationGuard, ScreenOrientation};
pub use overlay::{Command, ControlOverlay, OverlayInput};
pub use session::{PlayerHandle, PlayerSession};
pub use state::{PlaybackSnapshot, PlaybackState, ScrubGeometry, format_clock};
pub use transport::{SkipDirection, TransportState};
