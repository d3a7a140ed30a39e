//! YouTube Channels API types.

use crate::youtube_api::types::{PageInfo, Thumbnails};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `channels.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    /// The value will be `youtube#channelListResponse`.
    pub kind: String,
    /// Missing entirely (rather than empty) when no channel matched.
    #[serde(default)]
    pub items: VecDeque<Channel>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A `channel` resource contains information about a YouTube channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    pub snippet: ChannelSnippet,
}

/// The subset of a channel's snippet that the detail screen shows.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#snippet>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Channel avatars come in `default`, `medium` and `high` only.
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// The date and time that the channel was created.
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
}
