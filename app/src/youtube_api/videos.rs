//! YouTube Videos API types.

use crate::youtube_api::types::{LiveBroadcastContent, PageInfo, Thumbnails};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `videos.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    /// The value will be `youtube#videoListResponse`.
    pub kind: String,
    /// A list of videos that match the request criteria.
    #[serde(default)]
    pub items: VecDeque<Video>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `video` resource represents a YouTube video.
///
/// Only the `snippet` and `statistics` parts are requested.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Basic details about a video, shared by `videos.list` and `search.list` results.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSnippet {
    /// The date and time that the video was published.
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
    /// The ID of the channel the video was uploaded to.
    #[serde(rename = "channelId")]
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(rename = "liveBroadcastContent", default)]
    pub live_broadcast_content: LiveBroadcastContent,
}

/// Statistics about the video.
///
/// YouTube reports every count as a decimal string, and leaves out counts the owner has hidden.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub fn views(&self) -> Option<u64> {
        parse_count(self.view_count.as_deref())
    }

    pub fn likes(&self) -> Option<u64> {
        parse_count(self.like_count.as_deref())
    }

    pub fn comments(&self) -> Option<u64> {
        parse_count(self.comment_count.as_deref())
    }
}

fn parse_count(count: Option<&str>) -> Option<u64> {
    count?.trim().parse().ok()
}
