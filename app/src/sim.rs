//! A media backend that plays nothing but keeps time, for driving the player from a terminal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tubeview_player::orientation::{OrientationListener, OrientationLock, SubscriptionId};
use tubeview_player::{
    BackendEvents, MediaBackend, MediaSource, Orientation, ScreenOrientation, format_clock,
};

/// How often a playing [`SimulatedBackend`] reports progress.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Clock {
    paused: bool,
    /// Position at `since`.
    position: f64,
    since: Instant,
}

impl Clock {
    fn now(&self, duration: f64) -> f64 {
        let position = if self.paused {
            self.position
        } else {
            self.position + self.since.elapsed().as_secs_f64()
        };
        position.clamp(0.0, duration)
    }

    fn rebase(&mut self, duration: f64) {
        self.position = self.now(duration);
        self.since = Instant::now();
    }
}

#[derive(Debug)]
struct Playback {
    clock: Clock,
    volume: f32,
    full_screen: bool,
    picture_in_picture: bool,
    ticker: Option<JoinHandle<()>>,
}

/// Pretends to play a source of a fixed length.
///
/// Time only advances while playing. Progress is reported every tick until the end of the
/// media is reached, where playback stops by itself: the last tick reports the full duration and
/// is followed by [`BackendEvent::Ended`](tubeview_player::BackendEvent::Ended).
#[derive(Debug)]
pub struct SimulatedBackend {
    duration: f64,
    tick: Duration,
    playback: Arc<Mutex<Playback>>,
}

impl SimulatedBackend {
    pub fn new(duration: Duration) -> Self {
        Self::with_tick(duration, DEFAULT_TICK)
    }

    pub fn with_tick(duration: Duration, tick: Duration) -> Self {
        Self {
            duration: duration.as_secs_f64(),
            tick,
            playback: Arc::new(Mutex::new(Playback {
                clock: Clock {
                    paused: true,
                    position: 0.0,
                    since: Instant::now(),
                },
                volume: 1.0,
                full_screen: false,
                picture_in_picture: false,
                ticker: None,
            })),
        }
    }

    /// Where simulated playback is right now.
    pub fn position(&self) -> f64 {
        lock(&self.playback).clock.now(self.duration)
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.playback).clock.paused
    }

    pub fn volume(&self) -> f32 {
        lock(&self.playback).volume
    }

    pub fn is_full_screen(&self) -> bool {
        lock(&self.playback).full_screen
    }

    pub fn is_picture_in_picture(&self) -> bool {
        lock(&self.playback).picture_in_picture
    }

    fn start_ticker(&self, events: BackendEvents) -> JoinHandle<()> {
        let playback = Arc::clone(&self.playback);
        let duration = self.duration;
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !events.is_connected() {
                    tracing::trace!("player session gone; simulated clock stopped");
                    return;
                }
                let (position, ended) = {
                    let mut playback = lock(&playback);
                    if playback.clock.paused {
                        continue;
                    }
                    let position = playback.clock.now(duration);
                    let ended = position >= duration;
                    if ended {
                        playback.clock.rebase(duration);
                        playback.clock.paused = true;
                        tracing::debug!("simulated media reached its end");
                    }
                    (position, ended)
                };
                events.progress(position);
                if ended {
                    events.ended();
                }
            }
        })
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        if let Some(ticker) = lock(&self.playback).ticker.take() {
            ticker.abort();
        }
    }
}

impl MediaBackend for SimulatedBackend {
    async fn load(&self, source: &MediaSource, events: BackendEvents) -> eyre::Result<()> {
        tracing::debug!(
            location = %source.location,
            poster = source.poster.as_deref(),
            duration = %format_clock(self.duration),
            "simulating media"
        );
        let ticker = self.start_ticker(events.clone());
        {
            let mut playback = lock(&self.playback);
            playback.clock = Clock {
                paused: true,
                position: 0.0,
                since: Instant::now(),
            };
            if let Some(previous) = playback.ticker.replace(ticker) {
                previous.abort();
            }
        }
        events.loaded(self.duration);
        Ok(())
    }

    fn set_paused(&self, paused: bool) {
        let mut playback = lock(&self.playback);
        playback.clock.rebase(self.duration);
        playback.clock.paused = paused;
    }

    fn seek(&self, seconds: f64) {
        let mut playback = lock(&self.playback);
        playback.clock.position = seconds.clamp(0.0, self.duration);
        playback.clock.since = Instant::now();
        tracing::debug!(to = %format_clock(playback.clock.position), "seek");
    }

    async fn current_position(&self) -> eyre::Result<f64> {
        Ok(self.position())
    }

    fn set_volume(&self, volume: f32) {
        lock(&self.playback).volume = volume;
    }

    fn set_full_screen(&self, full_screen: bool) {
        lock(&self.playback).full_screen = full_screen;
    }

    fn enter_picture_in_picture(&self) {
        lock(&self.playback).picture_in_picture = true;
    }
}

/// A terminal's idea of screen orientation: always landscape, never rotates.
#[derive(Debug, Default)]
pub struct TerminalOrientation {
    next_id: Mutex<u64>,
}

impl ScreenOrientation for TerminalOrientation {
    fn unlock(&self) -> eyre::Result<()> {
        Ok(())
    }

    fn lock(&self, lock: OrientationLock) -> eyre::Result<()> {
        tracing::trace!(?lock, "ignoring orientation lock in a terminal");
        Ok(())
    }

    fn current(&self) -> eyre::Result<Orientation> {
        Ok(Orientation::LandscapeLeft)
    }

    fn subscribe(&self, _listener: OrientationListener) -> eyre::Result<SubscriptionId> {
        let mut next_id = lock(&self.next_id);
        *next_id += 1;
        Ok(SubscriptionId(*next_id))
    }

    fn unsubscribe(&self, _id: SubscriptionId) -> eyre::Result<()> {
        Ok(())
    }
}
