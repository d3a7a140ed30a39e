//! The video detail screen.
//!
//! Loading produces a [`VideoDetail`] with everything the page shows. Entering the screen with it
//! ([`DetailScreen::enter`]) unlocks rotation and starts a player session for the video; leaving
//! (or dropping the screen) stops the player before portrait is locked again.

use crate::format;
use crate::youtube_api::{Channel, Video, YouTubeClient};
use eyre::Context;
use jiff::tz::TimeZone;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use tubeview_player::{
    MediaBackend, MediaSource, Orientation, OrientationGuard, PlayerHandle, PlayerSession,
    ScreenOrientation,
};

/// How long leaving the screen waits for the player to stop.
pub const PLAYER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// The page URL YouTube serves a video at.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub channel_avatar: Option<String>,
    pub description: String,
    /// `<n> views`
    pub views: String,
    /// `<n> likes`
    pub likes: String,
    /// `dd.mm.yyyy`
    pub published: String,
    /// Shown by the player until the first frame is ready.
    pub poster_url: Option<String>,
}

impl VideoDetail {
    /// Combines a video with its channel. Without the channel, the video's own copy of the
    /// channel title is used and there is no avatar.
    pub fn new(video: Video, channel: Option<Channel>, tz: &TimeZone) -> Self {
        let snippet = video.snippet;
        let (channel_title, channel_avatar) = match channel {
            Some(channel) => (
                channel.snippet.title,
                channel.snippet.thumbnails.for_card().map(|t| t.url.clone()),
            ),
            None => (snippet.channel_title, None),
        };
        Self {
            title: snippet.title,
            channel_title,
            channel_avatar,
            description: snippet.description,
            views: format::views_label(video.statistics.views()),
            likes: format::likes_label(video.statistics.likes()),
            published: format::publish_date_in(snippet.published_at, tz),
            poster_url: snippet.thumbnails.largest().map(|t| t.url.clone()),
            video_id: video.id,
        }
    }

    pub fn media_source(&self) -> MediaSource {
        let source = MediaSource::remote(watch_url(&self.video_id));
        match &self.poster_url {
            Some(poster) => source.with_poster(poster.clone()),
            None => source,
        }
    }
}

async fn channel_or_log(client: &YouTubeClient, channel_id: &str) -> Option<Channel> {
    match client.get_channel(channel_id).await {
        Ok(channel) => channel,
        Err(e) => {
            tracing::warn!(channel_id, error = %e, "could not load channel");
            None
        }
    }
}

/// Loads everything the detail page shows for `video_id`.
///
/// If the caller already knows the uploader (as [`crate::VideoCard::open`] does), pass `channel_id` and the video
/// and channel are fetched concurrently; otherwise the channel is looked up once the video is
/// in. Returns `None` for unknown videos. A channel that cannot be loaded only costs the avatar.
#[instrument(skip(client, tz))]
pub async fn load_detail(
    client: &YouTubeClient,
    video_id: &str,
    channel_id: Option<&str>,
    tz: &TimeZone,
) -> eyre::Result<Option<VideoDetail>> {
    let (video, channel) = match channel_id {
        Some(channel_id) => {
            let (video, channel) = tokio::join!(
                client.get_video(video_id),
                channel_or_log(client, channel_id)
            );
            (video.context("fetch video")?, channel)
        }
        None => {
            let video = client.get_video(video_id).await.context("fetch video")?;
            let channel = match &video {
                Some(video) => channel_or_log(client, &video.snippet.channel_id).await,
                None => None,
            };
            (video, channel)
        }
    };

    let Some(video) = video else {
        tracing::debug!("video not found");
        return Ok(None);
    };
    Ok(Some(VideoDetail::new(video, channel, tz)))
}

/// The detail screen while it is on screen.
///
/// Holds the running player and the orientation unlock. Fields drop in declaration order, so the
/// player is gone before portrait is locked again.
#[derive(Debug)]
pub struct DetailScreen {
    player: PlayerHandle,
    orientation: OrientationGuard,
    detail: VideoDetail,
}

impl DetailScreen {
    /// Shows `detail`: unlocks rotation and starts playing the video on `backend`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enter<B: MediaBackend>(
        detail: VideoDetail,
        backend: Arc<B>,
        platform: Arc<dyn ScreenOrientation>,
    ) -> Self {
        let orientation = OrientationGuard::acquire(platform);
        let player = PlayerSession::spawn(backend, detail.media_source());
        tracing::info!(video_id = %detail.video_id, title = %detail.title, "opened video");
        Self {
            player,
            orientation,
            detail,
        }
    }

    pub fn detail(&self) -> &VideoDetail {
        &self.detail
    }

    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerHandle {
        &mut self.player
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.orientation()
    }

    /// Stops the player, then relocks portrait.
    ///
    /// Portrait is relocked even if the player fails or does not stop within
    /// [`PLAYER_STOP_TIMEOUT`]. Returns the player's error if it failed, for example because the
    /// video could not be loaded.
    pub async fn leave(self) -> eyre::Result<()> {
        let Self {
            player,
            orientation,
            detail,
        } = self;
        let result = match tokio::time::timeout(PLAYER_STOP_TIMEOUT, player.close()).await {
            Ok(result) => result,
            Err(_) => Err(eyre::eyre!(
                "player did not stop within {}s",
                PLAYER_STOP_TIMEOUT.as_secs()
            )),
        };
        drop(orientation);
        tracing::debug!(video_id = %detail.video_id, "left video");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeYouTube, channel_response, empty_list, video_response};
    use hyper::StatusCode;
    use pretty_assertions::assert_eq;
    use tubeview_player::OverlayInput;
    use tubeview_player::mock::{BackendCall, MockMediaBackend, MockOrientation, OrientationCall};
    use tubeview_player::orientation::OrientationLock;

    fn fake_api() -> impl Fn(&crate::testing::RecordedRequest) -> (StatusCode, String) {
        |request| match request.endpoint.as_str() {
            "videos" if request.param("id") == Some("vid1") => {
                (StatusCode::OK, video_response("vid1", "UCfire"))
            }
            "videos" => (StatusCode::OK, empty_list("youtube#videoListResponse")),
            "channels" if request.param("id") == Some("UCfire") => {
                (StatusCode::OK, channel_response("UCfire", "Fireship"))
            }
            "channels" => (StatusCode::NOT_FOUND, "no such channel".to_string()),
            other => panic!("unexpected endpoint {other}"),
        }
    }

    fn sample_detail() -> VideoDetail {
        VideoDetail {
            video_id: "vid1".to_string(),
            title: "Rust in 100 seconds".to_string(),
            channel_title: "Fireship".to_string(),
            channel_avatar: None,
            description: String::new(),
            views: "1 views".to_string(),
            likes: "1 likes".to_string(),
            published: "01.01.2024".to_string(),
            poster_url: Some("https://i.ytimg.com/vi/vid1/maxresdefault.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn loads_video_and_channel_together() {
        let api = FakeYouTube::start(fake_api()).await;
        let detail = load_detail(&api.client(), "vid1", Some("UCfire"), &TimeZone::UTC)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            detail,
            VideoDetail {
                video_id: "vid1".to_string(),
                title: "Rust in 100 seconds".to_string(),
                channel_title: "Fireship".to_string(),
                channel_avatar: Some("https://yt3.ggpht.com/avatar.jpg".to_string()),
                description: "Rust is a memory-safe compiled language.".to_string(),
                views: "25268952 views".to_string(),
                likes: "12345 likes".to_string(),
                published: "31.12.2023".to_string(),
                poster_url: Some("https://i.ytimg.com/vi/vid1/maxresdefault.jpg".to_string()),
            }
        );
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn looks_up_the_channel_from_the_video() {
        let api = FakeYouTube::start(fake_api()).await;
        let detail = load_detail(&api.client(), "vid1", None, &TimeZone::UTC)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.channel_title, "Fireship");

        let requests = api.requests();
        assert_eq!(requests[0].endpoint, "videos");
        assert_eq!(requests[1].endpoint, "channels");
        assert_eq!(requests[1].param("id"), Some("UCfire"));
    }

    #[tokio::test]
    async fn channel_failures_fall_back_to_the_snippet() {
        let api = FakeYouTube::start(fake_api()).await;
        let detail = load_detail(&api.client(), "vid1", Some("UCgone"), &TimeZone::UTC)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.channel_title, "Fireship");
        assert_eq!(detail.channel_avatar, None);
    }

    #[tokio::test]
    async fn unknown_videos_are_none() {
        let api = FakeYouTube::start(fake_api()).await;
        let detail = load_detail(&api.client(), "missing", None, &TimeZone::UTC)
            .await
            .unwrap();
        assert_eq!(detail, None);
        assert_eq!(api.requests().len(), 1, "no channel lookup without a video");
    }

    #[tokio::test]
    async fn video_failures_are_errors() {
        let api = FakeYouTube::start(|_| (StatusCode::FORBIDDEN, "forbidden".to_string())).await;
        let err = load_detail(&api.client(), "vid1", Some("UCfire"), &TimeZone::UTC)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "fetch video");
    }

    #[test]
    fn media_source_carries_the_poster() {
        let source = sample_detail().media_source();
        assert_eq!(
            source,
            MediaSource::remote("https://www.youtube.com/watch?v=vid1")
                .with_poster("https://i.ytimg.com/vi/vid1/maxresdefault.jpg")
        );
    }

    #[tokio::test]
    async fn entering_and_leaving_the_screen() {
        let backend = Arc::new(MockMediaBackend::new());
        let platform = Arc::new(MockOrientation::new(Orientation::PortraitUp));
        let mut screen = DetailScreen::enter(sample_detail(), Arc::clone(&backend), platform.clone());
        assert_eq!(screen.orientation(), Orientation::PortraitUp);

        let calls = backend.wait_for_calls(3).await;
        assert_eq!(calls[0], BackendCall::Load(sample_detail().media_source()));

        platform.rotate(Orientation::LandscapeLeft);
        assert!(screen.orientation().is_landscape());

        backend.events().unwrap().loaded(60.0);
        screen.player().send(OverlayInput::TogglePlayPause).unwrap();
        let snapshot = screen.player_mut().wait_for(|s| !s.paused).await.unwrap();
        assert_eq!(snapshot.duration, 60.0);

        screen.leave().await.unwrap();
        assert_eq!(backend.calls().last(), Some(&BackendCall::SetPaused(true)));
        assert_eq!(
            platform.calls().last(),
            Some(&OrientationCall::Lock(OrientationLock::Portrait))
        );
        assert_eq!(platform.listeners(), 0);
    }

    #[tokio::test]
    async fn leaving_while_the_video_is_still_loading() {
        let backend = Arc::new(MockMediaBackend::new());
        backend.stall_loads();
        let platform = Arc::new(MockOrientation::new(Orientation::PortraitUp));
        let screen = DetailScreen::enter(sample_detail(), Arc::clone(&backend), platform.clone());
        backend.wait_for_calls(1).await;

        tokio::time::timeout(PLAYER_STOP_TIMEOUT, screen.leave())
            .await
            .expect("leaving does not wait for the load")
            .unwrap();
        assert_eq!(
            platform.calls().last(),
            Some(&OrientationCall::Lock(OrientationLock::Portrait))
        );
        assert_eq!(platform.listeners(), 0);
    }

    #[tokio::test]
    async fn leaving_reports_load_failures_and_still_relocks() {
        let backend = Arc::new(MockMediaBackend::new());
        backend.fail_load("unsupported codec");
        let platform = Arc::new(MockOrientation::new(Orientation::PortraitUp));
        let screen = DetailScreen::enter(sample_detail(), backend, platform.clone());

        let err = screen.leave().await.unwrap_err();
        assert!(format!("{err:?}").contains("unsupported codec"), "{err:?}");
        assert_eq!(
            platform.calls().last(),
            Some(&OrientationCall::Lock(OrientationLock::Portrait))
        );
    }
}
