//! The control overlay: user input and backend callbacks in, backend commands out.
//!
//! [`ControlOverlay`] is a synchronous state machine. It never calls a backend itself; instead
//! [`ControlOverlay::apply`] returns the [`Command`]s that should be issued, which keeps the
//! whole input-to-command mapping testable without a backend and lets the
//! [`crate::session`] event loop decide how to dispatch them.
//!
//! # Skips and stale positions
//!
//! A skip needs the backend's actual position, which is only available through an asynchronous
//! query. While that query is in flight, progress ticks and seeks keep arriving, so by the time
//! the answer comes back it may be older than what the overlay already shows. Every tick and
//! every seek therefore bumps a *position generation*; each query remembers the generation it was
//! issued under. An answer whose generation is still current is used as-is. An answer that has
//! been overtaken is discarded and the skip is computed from the overlay's own, fresher,
//! `current_time` instead. Either way the skip happens exactly once.

use crate::backend::BackendEvent;
use crate::scrub::{SeekTarget, seek_target};
use crate::state::{PlaybackSnapshot, PlaybackState, ScrubGeometry};
use crate::transport::{SkipDirection, TransportState, skip_target};
use std::collections::HashMap;

/// Everything the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayInput {
    TogglePlayPause,
    ToggleMute,
    ToggleFullScreen,
    PictureInPicture,
    Skip(SkipDirection),
    /// The scrub track was laid out (or resized) with this width.
    ScrubLayout { track_width_px: f64 },
    /// A single tap on the scrub track.
    ScrubTap { touch_x: f64 },
    /// A finger went down on the scrub track and may start dragging.
    ScrubStart { touch_x: f64 },
    ScrubMove { touch_x: f64 },
    /// The finger was lifted; this is where the seek is committed.
    ScrubEnd { touch_x: f64 },
    /// The gesture was taken over by something else (e.g. a scroll view).
    ScrubCancel,
    Backend(BackendEvent),
    /// Answer to a [`Command::QueryPosition`]; `None` if the query failed.
    PositionResolved {
        ticket: PositionTicket,
        position: Option<f64>,
    },
}

/// Instructions for the media backend produced by [`ControlOverlay::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetPaused(bool),
    Seek(f64),
    SetVolume(f32),
    SetFullScreen(bool),
    EnterPictureInPicture,
    /// Ask the backend for its position and feed the answer back as
    /// [`OverlayInput::PositionResolved`] with this ticket.
    QueryPosition(PositionTicket),
}

/// Identifies one outstanding position query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionTicket(u64);

#[derive(Debug, Clone, Copy)]
struct PendingSkip {
    direction: SkipDirection,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Scrub {
    /// Position to go back to if the gesture is cancelled.
    resume_at: f64,
    last: SeekTarget,
}

/// Playback controls layered over a media backend.
#[derive(Debug, Default)]
pub struct ControlOverlay {
    state: PlaybackState,
    geometry: ScrubGeometry,
    scrub: Option<Scrub>,
    generation: u64,
    next_ticket: u64,
    pending_skips: HashMap<PositionTicket, PendingSkip>,
}

impl ControlOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn geometry(&self) -> ScrubGeometry {
        self.geometry
    }

    pub fn transport(&self) -> TransportState {
        TransportState::from_paused(self.state.paused())
    }

    /// Whether a drag on the scrub bar is in progress.
    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    /// Number of skips still waiting for a position answer.
    pub fn pending_skips(&self) -> usize {
        self.pending_skips.len()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::capture(&self.state, self.is_scrubbing())
    }

    /// Applies one input and returns the backend commands it calls for, in order.
    pub fn apply(&mut self, input: OverlayInput) -> Vec<Command> {
        match input {
            OverlayInput::TogglePlayPause => {
                let paused = self.state.toggle_paused();
                tracing::debug!(state = %self.transport(), "transport toggled");
                vec![Command::SetPaused(paused)]
            }
            OverlayInput::ToggleMute => {
                let muted = self.state.toggle_muted();
                tracing::debug!(muted, "mute toggled");
                vec![Command::SetVolume(self.state.volume())]
            }
            OverlayInput::ToggleFullScreen => {
                vec![Command::SetFullScreen(self.state.toggle_full_screen())]
            }
            OverlayInput::PictureInPicture => vec![Command::EnterPictureInPicture],
            OverlayInput::Skip(direction) => {
                let ticket = PositionTicket(self.next_ticket);
                self.next_ticket += 1;
                self.pending_skips.insert(
                    ticket,
                    PendingSkip {
                        direction,
                        generation: self.generation,
                    },
                );
                vec![Command::QueryPosition(ticket)]
            }
            OverlayInput::PositionResolved { ticket, position } => {
                self.resolve_skip(ticket, position).into_iter().collect()
            }
            OverlayInput::ScrubLayout { track_width_px } => {
                self.geometry.resize(track_width_px);
                tracing::trace!(
                    track_width_px = self.geometry.track_width_px(),
                    "scrub track measured"
                );
                Vec::new()
            }
            OverlayInput::ScrubTap { touch_x } => match self.target(touch_x) {
                Some(target) => vec![self.seek_to(target.time)],
                None => Vec::new(),
            },
            OverlayInput::ScrubStart { touch_x } => {
                if let Some(target) = self.target(touch_x) {
                    // a repeated start keeps the pre-drag position to fall back to
                    let resume_at = match self.scrub {
                        Some(scrub) => scrub.resume_at,
                        None => self.state.current_time(),
                    };
                    self.scrub = Some(Scrub {
                        resume_at,
                        last: target,
                    });
                    self.state.set_current_time(target.time);
                }
                Vec::new()
            }
            OverlayInput::ScrubMove { touch_x } => {
                if self.scrub.is_some()
                    && let Some(target) = self.target(touch_x)
                {
                    if let Some(scrub) = self.scrub.as_mut() {
                        scrub.last = target;
                    }
                    self.state.set_current_time(target.time);
                }
                Vec::new()
            }
            OverlayInput::ScrubEnd { touch_x } => {
                let Some(scrub) = self.scrub.take() else {
                    return Vec::new();
                };
                let target = self.target(touch_x).unwrap_or(scrub.last);
                vec![self.seek_to(target.time)]
            }
            OverlayInput::ScrubCancel => {
                if let Some(scrub) = self.scrub.take() {
                    self.state.set_current_time(scrub.resume_at);
                }
                Vec::new()
            }
            OverlayInput::Backend(BackendEvent::Loaded { duration }) => {
                self.state.set_duration(duration);
                tracing::debug!(duration = self.state.duration(), "media loaded");
                Vec::new()
            }
            OverlayInput::Backend(BackendEvent::Progress { current_time }) => {
                self.generation += 1;
                // the knob follows the finger, not the backend, while dragging
                if self.scrub.is_none() {
                    self.state.set_current_time(current_time);
                }
                Vec::new()
            }
            OverlayInput::Backend(BackendEvent::Ended) => {
                // the backend already stopped; only the button needs to catch up
                self.generation += 1;
                if self.scrub.is_none() {
                    self.state.set_current_time(self.state.duration());
                }
                self.state.set_paused(true);
                tracing::debug!("playback reached the end");
                Vec::new()
            }
        }
    }

    fn target(&self, touch_x: f64) -> Option<SeekTarget> {
        let target = seek_target(touch_x, self.geometry, self.state.duration());
        if target.is_none() {
            tracing::trace!(
                touch_x,
                duration = self.state.duration(),
                track_width_px = self.geometry.track_width_px(),
                "ignoring scrub touch before load or layout"
            );
        }
        target
    }

    /// Optimistically moves the clock and produces the matching seek.
    fn seek_to(&mut self, seconds: f64) -> Command {
        let seconds = self.state.clamp_time(seconds);
        self.generation += 1;
        self.state.set_current_time(seconds);
        tracing::debug!(to = seconds, "seeking");
        Command::Seek(seconds)
    }

    fn resolve_skip(&mut self, ticket: PositionTicket, position: Option<f64>) -> Option<Command> {
        let Some(pending) = self.pending_skips.remove(&ticket) else {
            tracing::debug!(?ticket, "dropping answer for unknown position query");
            return None;
        };

        let base = match position {
            Some(position) if position.is_finite() && pending.generation == self.generation => {
                position
            }
            Some(position) => {
                tracing::debug!(
                    answered = position,
                    current = self.state.current_time(),
                    "position answer overtaken by newer progress; skipping from current time"
                );
                self.state.current_time()
            }
            None => self.state.current_time(),
        };

        let target = skip_target(base, pending.direction, self.state.duration());
        Some(self.seek_to(target))
    }
}
