//! Video list rows, as shown on the home feed and in search results.

use crate::detail::{VideoDetail, load_detail};
use crate::format;
use crate::youtube_api::{SearchResult, YouTubeClient};
use jiff::tz::TimeZone;

/// What a video list shows for one video, and what opening it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCard {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    /// `dd.mm.yyyy`
    pub published: String,
    pub thumbnail_url: Option<String>,
}

impl VideoCard {
    /// Builds the card for a search hit. Hits that are not videos have no card.
    pub fn from_result(result: &SearchResult, tz: &TimeZone) -> Option<Self> {
        let video_id = result.video_id()?;
        let snippet = &result.snippet;
        Some(Self {
            video_id: video_id.to_string(),
            title: snippet.title.clone(),
            channel_id: snippet.channel_id.clone(),
            channel_title: snippet.channel_title.clone(),
            published: format::publish_date_in(snippet.published_at, tz),
            thumbnail_url: snippet.thumbnails.for_card().map(|t| t.url.clone()),
        })
    }

    /// Loads the detail page this card leads to.
    ///
    /// The card already names the uploader, so the video and its channel are fetched together.
    pub async fn open(
        &self,
        client: &YouTubeClient,
        tz: &TimeZone,
    ) -> eyre::Result<Option<VideoDetail>> {
        load_detail(client, &self.video_id, Some(&self.channel_id), tz).await
    }

    pub(crate) fn from_results(results: &[SearchResult], tz: &TimeZone) -> Vec<Self> {
        results
            .iter()
            .filter_map(|result| Self::from_result(result, tz))
            .collect()
    }
}
