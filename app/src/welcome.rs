//! The screen the app opens on.

use crate::search::SearchScreen;
use jiff::tz::TimeZone;

pub const WELCOME_TEXT: &str = "Welcome to the best\nYouTube-based learning\napplication.";

pub const GUEST_ENTRY: &str = "Log in as guest";

/// A link in the welcome screen's footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const TERMS: LegalLink = LegalLink {
    label: "Terms and Conditions",
    url: "https://example.com",
};

pub const PRIVACY_POLICY: LegalLink = LegalLink {
    label: "Privacy Policy",
    url: "https://example.com",
};

/// The welcome screen. There is no account system, so its only way forward is as a guest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WelcomeScreen;

impl WelcomeScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn text(&self) -> &'static str {
        WELCOME_TEXT
    }

    pub fn guest_entry(&self) -> &'static str {
        GUEST_ENTRY
    }

    pub fn footer(&self) -> String {
        format!(
            "By continuing you agree with {} and {}",
            TERMS.label, PRIVACY_POLICY.label
        )
    }

    pub fn links(&self) -> [LegalLink; 2] {
        [TERMS, PRIVACY_POLICY]
    }

    /// Takes the guest entry, which leads to an empty search screen.
    pub fn continue_as_guest(self, tz: TimeZone) -> SearchScreen {
        tracing::debug!("continuing as guest");
        SearchScreen::new(tz)
    }
}
