//! Browse and watch YouTube videos.
//!
//! The screens are plain state holders that talk to YouTube through [`youtube_api`]:
//!
//! - [`welcome`]: where the app opens; continues as a guest into search.
//! - [`feed`]: the home screen's topic rows.
//! - [`search`]: a query with a sort picker and its results.
//! - [`detail`]: one video's details, plus the player and rotation unlock that come with it.
//!
//! Playback itself is the business of the `tubeview-player` crate; [`sim`] provides the backend
//! and orientation platform the terminal front end plays on.

pub mod card;
pub mod config;
pub mod detail;
pub mod feed;
pub mod format;
pub mod search;
pub mod sim;
pub mod welcome;
pub mod youtube_api;

#[cfg(test)]
mod testing;

pub use card::VideoCard;
pub use config::Config;
pub use detail::{DetailScreen, VideoDetail};
pub use search::SearchScreen;
pub use welcome::WelcomeScreen;
pub use youtube_api::YouTubeClient;
