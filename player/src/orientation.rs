//! Screen orientation while a video is on screen.
//!
//! The rest of the application runs portrait-only. The video detail screen unlocks rotation so
//! the player can go landscape, follows the device's orientation while it is shown, and puts the
//! portrait lock back when it goes away. [`OrientationGuard`] ties that to a scope: acquiring it
//! unlocks and subscribes, dropping it unsubscribes and relocks, on every way out of the screen.
//!
//! Orientation support varies a lot between platforms, so none of this is allowed to fail:
//! platform errors are logged and otherwise ignored.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Physical orientation of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Unknown,
    PortraitUp,
    PortraitDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    pub fn is_landscape(self) -> bool {
        matches!(self, Orientation::LandscapeLeft | Orientation::LandscapeRight)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::Unknown => "unknown",
            Orientation::PortraitUp => "portrait",
            Orientation::PortraitDown => "portrait (upside down)",
            Orientation::LandscapeLeft => "landscape (left)",
            Orientation::LandscapeRight => "landscape (right)",
        };
        f.write_str(name)
    }
}

/// Orientations the platform can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationLock {
    Portrait,
    Landscape,
}

/// Identifies a registered orientation listener on the platform side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Where the platform delivers orientation changes.
#[derive(Debug, Clone)]
pub struct OrientationListener {
    tx: watch::Sender<Orientation>,
}

impl OrientationListener {
    pub fn notify(&self, orientation: Orientation) {
        tracing::trace!(%orientation, "orientation changed");
        self.tx.send_replace(orientation);
    }
}

/// The platform's orientation API.
pub trait ScreenOrientation: Send + Sync {
    /// Allows the screen to follow the device's rotation.
    fn unlock(&self) -> eyre::Result<()>;

    fn lock(&self, lock: OrientationLock) -> eyre::Result<()>;

    fn current(&self) -> eyre::Result<Orientation>;

    fn subscribe(&self, listener: OrientationListener) -> eyre::Result<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId) -> eyre::Result<()>;
}

/// Holds rotation unlocked and tracks the device orientation for as long as it lives.
pub struct OrientationGuard {
    platform: Arc<dyn ScreenOrientation>,
    subscription: Option<SubscriptionId>,
    latest: watch::Receiver<Orientation>,
}

impl fmt::Debug for OrientationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrientationGuard")
            .field("subscription", &self.subscription)
            .field("orientation", &*self.latest.borrow())
            .finish()
    }
}

impl OrientationGuard {
    /// Unlocks rotation, reads the current orientation and starts listening for changes.
    ///
    /// Never fails; whatever the platform does not support is skipped.
    pub fn acquire(platform: Arc<dyn ScreenOrientation>) -> Self {
        if let Err(e) = platform.unlock() {
            tracing::warn!(error = %e, "could not unlock screen orientation");
        }

        let initial = platform.current().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read screen orientation");
            Orientation::Unknown
        });
        let (tx, latest) = watch::channel(initial);

        let subscription = match platform.subscribe(OrientationListener { tx }) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "could not subscribe to orientation changes");
                None
            }
        };

        tracing::debug!(orientation = %initial, ?subscription, "orientation unlocked");
        Self {
            platform,
            subscription,
            latest,
        }
    }

    /// The most recently reported orientation.
    pub fn orientation(&self) -> Orientation {
        *self.latest.borrow()
    }

    /// A receiver for layouts that want to react to rotation.
    pub fn watch(&self) -> watch::Receiver<Orientation> {
        self.latest.clone()
    }
}

impl Drop for OrientationGuard {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take()
            && let Err(e) = self.platform.unsubscribe(id)
        {
            tracing::warn!(error = %e, ?id, "could not unsubscribe from orientation changes");
        }
        if let Err(e) = self.platform.lock(OrientationLock::Portrait) {
            tracing::warn!(error = %e, "could not relock portrait orientation");
        }
        tracing::debug!("orientation relocked to portrait");
    }
}
