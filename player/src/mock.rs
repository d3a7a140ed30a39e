//! Test doubles for the platform-facing traits.
//!
//! [`MockMediaBackend`] records every command it receives and hands out positions on demand, so
//! tests can drive a [`crate::session::PlayerSession`] end to end: emit backend events through the
//! captured [`BackendEvents`], send user input through the handle, then assert on the recorded
//! [`BackendCall`]s. [`MockOrientation`] does the same for the orientation platform.

use crate::backend::{BackendEvents, MediaBackend, MediaSource};
use crate::orientation::{
    Orientation, OrientationListener, OrientationLock, ScreenOrientation, SubscriptionId,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, Semaphore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One interaction with a [`MockMediaBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Load(MediaSource),
    SetPaused(bool),
    Seek(f64),
    QueryPosition,
    SetVolume(f32),
    SetFullScreen(bool),
    EnterPictureInPicture,
}

/// A media backend that plays nothing and remembers everything.
#[derive(Debug)]
pub struct MockMediaBackend {
    calls: Mutex<Vec<BackendCall>>,
    changed: Notify,
    events: Mutex<Option<BackendEvents>>,
    position: Mutex<f64>,
    load_error: Mutex<Option<String>>,
    stall_loads: Mutex<bool>,
    position_error: Mutex<Option<String>>,
    hold_positions: Mutex<bool>,
    released: Semaphore,
}

impl Default for MockMediaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::default(),
            changed: Notify::new(),
            events: Mutex::default(),
            position: Mutex::new(0.0),
            load_error: Mutex::default(),
            stall_loads: Mutex::new(false),
            position_error: Mutex::default(),
            hold_positions: Mutex::new(false),
            released: Semaphore::new(0),
        }
    }

    /// Everything the backend has been asked to do so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    /// Waits until at least `count` calls have been recorded and returns them.
    pub async fn wait_for_calls(&self, count: usize) -> Vec<BackendCall> {
        loop {
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            self.changed.notified().await;
        }
    }

    /// The event sender handed over by the most recent load.
    pub fn events(&self) -> Option<BackendEvents> {
        lock(&self.events).clone()
    }

    /// Sets the answer to subsequent position queries.
    pub fn set_position(&self, seconds: f64) {
        *lock(&self.position) = seconds;
    }

    /// Makes subsequent loads fail with `message`.
    pub fn fail_load(&self, message: impl Into<String>) {
        *lock(&self.load_error) = Some(message.into());
    }

    /// Makes subsequent loads hang forever after being recorded.
    pub fn stall_loads(&self) {
        *lock(&self.stall_loads) = true;
    }

    /// Makes subsequent position queries fail with `message`.
    pub fn fail_position_queries(&self, message: impl Into<String>) {
        *lock(&self.position_error) = Some(message.into());
    }

    /// Parks position queries until [`Self::release_position_query`] is called.
    pub fn hold_position_queries(&self) {
        *lock(&self.hold_positions) = true;
    }

    /// Lets one parked position query answer.
    pub fn release_position_query(&self) {
        self.released.add_permits(1);
    }

    fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
        self.changed.notify_one();
    }
}

impl MediaBackend for MockMediaBackend {
    async fn load(&self, source: &MediaSource, events: BackendEvents) -> eyre::Result<()> {
        *lock(&self.events) = Some(events);
        self.record(BackendCall::Load(source.clone()));
        let stalled = *lock(&self.stall_loads);
        if stalled {
            std::future::pending::<()>().await;
        }
        match lock(&self.load_error).clone() {
            Some(message) => Err(eyre::eyre!(message)),
            None => Ok(()),
        }
    }

    fn set_paused(&self, paused: bool) {
        self.record(BackendCall::SetPaused(paused));
    }

    fn seek(&self, seconds: f64) {
        self.record(BackendCall::Seek(seconds));
    }

    async fn current_position(&self) -> eyre::Result<f64> {
        self.record(BackendCall::QueryPosition);
        let held = *lock(&self.hold_positions);
        if held {
            let permit = self
                .released
                .acquire()
                .await
                .map_err(|_| eyre::eyre!("mock backend closed"))?;
            permit.forget();
        }
        if let Some(message) = lock(&self.position_error).clone() {
            eyre::bail!(message);
        }
        Ok(*lock(&self.position))
    }

    fn set_volume(&self, volume: f32) {
        self.record(BackendCall::SetVolume(volume));
    }

    fn set_full_screen(&self, full_screen: bool) {
        self.record(BackendCall::SetFullScreen(full_screen));
    }

    fn enter_picture_in_picture(&self) {
        self.record(BackendCall::EnterPictureInPicture);
    }
}

/// One interaction with a [`MockOrientation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrientationCall {
    Unlock,
    Lock(OrientationLock),
    Current,
    Subscribe(SubscriptionId),
    Unsubscribe(SubscriptionId),
}

/// An orientation platform that can be rotated by hand.
#[derive(Debug)]
pub struct MockOrientation {
    supported: bool,
    orientation: Mutex<Orientation>,
    calls: Mutex<Vec<OrientationCall>>,
    listeners: Mutex<HashMap<SubscriptionId, OrientationListener>>,
    next_id: Mutex<u64>,
}

impl MockOrientation {
    pub fn new(initial: Orientation) -> Self {
        Self {
            supported: true,
            orientation: Mutex::new(initial),
            calls: Mutex::default(),
            listeners: Mutex::default(),
            next_id: Mutex::new(1),
        }
    }

    /// A platform on which every orientation call fails.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Orientation::Unknown)
        }
    }

    pub fn calls(&self) -> Vec<OrientationCall> {
        lock(&self.calls).clone()
    }

    /// Number of listeners currently subscribed.
    pub fn listeners(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Turns the device and notifies every listener.
    pub fn rotate(&self, orientation: Orientation) {
        *lock(&self.orientation) = orientation;
        for listener in lock(&self.listeners).values() {
            listener.notify(orientation);
        }
    }

    fn record(&self, call: OrientationCall) -> eyre::Result<()> {
        lock(&self.calls).push(call);
        if self.supported {
            Ok(())
        } else {
            eyre::bail!("screen orientation is not available on this platform")
        }
    }
}

impl ScreenOrientation for MockOrientation {
    fn unlock(&self) -> eyre::Result<()> {
        self.record(OrientationCall::Unlock)
    }

    fn lock(&self, lock: OrientationLock) -> eyre::Result<()> {
        self.record(OrientationCall::Lock(lock))
    }

    fn current(&self) -> eyre::Result<Orientation> {
        self.record(OrientationCall::Current)?;
        Ok(*lock(&self.orientation))
    }

    fn subscribe(&self, listener: OrientationListener) -> eyre::Result<SubscriptionId> {
        let id = {
            let mut next_id = lock(&self.next_id);
            let id = SubscriptionId(*next_id);
            *next_id += 1;
            id
        };
        self.record(OrientationCall::Subscribe(id))?;
        lock(&self.listeners).insert(id, listener);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> eyre::Result<()> {
        self.record(OrientationCall::Unsubscribe(id))?;
        lock(&self.listeners).remove(&id);
        Ok(())
    }
}
