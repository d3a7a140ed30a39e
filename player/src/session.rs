//! The player's event loop.
//!
//! A session owns a [`ControlOverlay`] and a shared reference to the media backend. User input
//! (through a [`PlayerHandle`]) and backend callbacks (through [`BackendEvents`]) are funnelled
//! into one channel and processed strictly in arrival order on a single task, so the overlay
//! state needs no locking. After every input the session publishes a fresh
//! [`PlaybackSnapshot`] on a `watch` channel for whatever draws the overlay.
//!
//! Position queries for the skip buttons are the one thing that may take a while, so each runs
//! on its own task and its answer re-enters the loop as just another input.
//!
//! The session ends when its [`PlayerHandle`] is closed or dropped. On the way out it pauses the
//! backend and drops its inbox, after which backend callbacks go nowhere.

use crate::backend::{BackendEvent, BackendEvents, MediaBackend, MediaSource};
use crate::overlay::{Command, ControlOverlay, OverlayInput, PositionTicket};
use crate::state::PlaybackSnapshot;
use eyre::Context;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Everything that can arrive at a session's inbox.
#[derive(Debug)]
pub(crate) enum PlayerInput {
    User(OverlayInput),
    Backend(BackendEvent),
    Position {
        ticket: PositionTicket,
        position: Option<f64>,
    },
}

impl PlayerInput {
    fn into_overlay_input(self) -> OverlayInput {
        match self {
            PlayerInput::User(input) => input,
            PlayerInput::Backend(event) => OverlayInput::Backend(event),
            PlayerInput::Position { ticket, position } => {
                OverlayInput::PositionResolved { ticket, position }
            }
        }
    }
}

/// A player that has been set up but not started yet.
///
/// Most callers want [`PlayerSession::spawn`]; [`PlayerSession::run`] is there for callers that
/// manage their own tasks.
#[derive(Debug)]
pub struct PlayerSession<B> {
    backend: Arc<B>,
    source: MediaSource,
    overlay: ControlOverlay,
    inbox: mpsc::UnboundedReceiver<PlayerInput>,
    tx: mpsc::UnboundedSender<PlayerInput>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    closed: oneshot::Receiver<()>,
}

impl<B: MediaBackend> PlayerSession<B> {
    /// Creates a session for `source` on `backend`, along with the handle that controls it.
    pub fn new(backend: Arc<B>, source: MediaSource) -> (Self, PlayerHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(PlaybackSnapshot::default());
        let (close_tx, closed) = oneshot::channel();
        let handle = PlayerHandle {
            tx: tx.clone(),
            snapshots: snapshot_rx,
            _close: close_tx,
            task: None,
        };
        let session = Self {
            backend,
            source,
            overlay: ControlOverlay::new(),
            inbox,
            tx,
            snapshots,
            closed,
        };
        (session, handle)
    }

    /// Starts a session on the current tokio runtime.
    pub fn spawn(backend: Arc<B>, source: MediaSource) -> PlayerHandle {
        let (session, mut handle) = Self::new(backend, source);
        handle.task = Some(tokio::spawn(session.run()));
        handle
    }

    /// Loads the source and processes inputs until the handle goes away.
    ///
    /// Fails only if the backend refuses the source.
    #[tracing::instrument(skip(self), fields(source = %self.source.location))]
    pub async fn run(mut self) -> eyre::Result<()> {
        let events = BackendEvents::new(self.tx.clone());
        let loaded = tokio::select! {
            biased;
            _ = &mut self.closed => None,
            result = self.backend.load(&self.source, events) => Some(result),
        };
        let Some(loaded) = loaded else {
            tracing::debug!("closed before the media source finished loading");
            self.backend.set_paused(true);
            self.inbox.close();
            return Ok(());
        };
        loaded.with_context(|| format!("load {}", self.source.location))?;

        // the backend starts out mirroring the overlay's initial props
        let state = self.overlay.state();
        self.backend.set_paused(state.paused());
        self.backend.set_volume(state.volume());
        tracing::debug!("media source loaded");

        loop {
            tokio::select! {
                biased;
                _ = &mut self.closed => break,
                input = self.inbox.recv() => {
                    // we hold a sender ourselves, so the inbox never runs dry
                    let Some(input) = input else { break };
                    self.process(input.into_overlay_input());
                }
            }
        }

        self.backend.set_paused(true);
        self.inbox.close();
        tracing::debug!("player session ended");
        Ok(())
    }

    fn process(&mut self, input: OverlayInput) {
        tracing::trace!(?input, "player input");
        for command in self.overlay.apply(input) {
            self.dispatch(command);
        }
        self.snapshots.send_replace(self.overlay.snapshot());
    }

    fn dispatch(&self, command: Command) {
        match command {
            Command::SetPaused(paused) => self.backend.set_paused(paused),
            Command::Seek(seconds) => self.backend.seek(seconds),
            Command::SetVolume(volume) => self.backend.set_volume(volume),
            Command::SetFullScreen(full_screen) => self.backend.set_full_screen(full_screen),
            Command::EnterPictureInPicture => self.backend.enter_picture_in_picture(),
            Command::QueryPosition(ticket) => {
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let position = match backend.current_position().await {
                        Ok(position) => Some(position),
                        Err(e) => {
                            tracing::warn!(error = %e, "position query failed");
                            None
                        }
                    };
                    // fails only if the session ended in the meantime
                    let _ = tx.send(PlayerInput::Position { ticket, position });
                });
            }
        }
    }
}

/// Controls a running [`PlayerSession`] and observes its state.
///
/// Dropping the handle ends the session.
#[derive(Debug)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<PlayerInput>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    _close: oneshot::Sender<()>,
    task: Option<JoinHandle<eyre::Result<()>>>,
}

impl PlayerHandle {
    /// Delivers one input to the session.
    pub fn send(&self, input: OverlayInput) -> eyre::Result<()> {
        self.tx
            .send(PlayerInput::User(input))
            .map_err(|_| eyre::eyre!("player session has ended"))
    }

    /// The most recently published overlay state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every state the session publishes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until the published state satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&PlaybackSnapshot) -> bool,
    ) -> eyre::Result<PlaybackSnapshot> {
        let snapshot = self
            .snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| eyre::eyre!("player session ended while waiting for state"))?;
        Ok((*snapshot).clone())
    }

    /// Ends the session and waits for it to wind down.
    ///
    /// Returns the session's own error, if it failed (for example because the source could not
    /// be loaded).
    pub async fn close(mut self) -> eyre::Result<()> {
        let task = self.task.take();
        drop(self);
        match task {
            Some(task) => task.await.context("join player session")?,
            None => Ok(()),
        }
    }
}
