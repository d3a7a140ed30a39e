//! YouTube Search API types.

use crate::youtube_api::types::PageInfo;
use crate::youtube_api::videos::VideoSnippet;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Results per page when the request does not say otherwise.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// The most results `search.list` will return in a single page.
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// How `search.list` orders its results.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list#order>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Newest first.
    Date,
    /// Most viewed first.
    ViewCount,
    /// Most relevant to the query first. This is YouTube's default.
    Relevance,
}

impl SortOrder {
    /// The value of the `order` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::ViewCount => "viewCount",
            SortOrder::Relevance => "relevance",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// Parameters for a `search.list` call restricted to videos.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SearchRequest {
    /// The search terms.
    #[builder(setter(into))]
    query: String,

    #[builder(setter(strip_option), default)]
    order: Option<SortOrder>,

    /// Between 1 and [`MAX_RESULTS_LIMIT`].
    #[builder(default = "DEFAULT_MAX_RESULTS")]
    max_results: u32,

    #[builder(setter(into, strip_option), default)]
    page_token: Option<String>,
}

impl SearchRequest {
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    /// The same search, starting at a different page.
    pub fn at_page(&self, page_token: Option<String>) -> Self {
        Self {
            page_token,
            ..self.clone()
        }
    }

    /// The query string parameters for this request, API key excluded.
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", self.max_results.to_string()),
            ("q", self.query.clone()),
        ];
        if let Some(order) = self.order {
            params.push(("order", order.as_query_value().to_string()));
        }
        if let Some(token) = &self.page_token {
            params.push(("pageToken", token.clone()));
        }
        params
    }
}

impl SearchRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(query) = &self.query
            && query.trim().is_empty()
        {
            return Err("search query must not be empty".to_string());
        }
        if let Some(max_results) = self.max_results
            && !(1..=MAX_RESULTS_LIMIT).contains(&max_results)
        {
            return Err(format!(
                "max results must be between 1 and {MAX_RESULTS_LIMIT}, got {max_results}"
            ));
        }
        Ok(())
    }
}

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    /// The value will be `youtube#searchListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    #[serde(rename = "prevPageToken")]
    pub prev_page_token: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<SearchResult>,
    pub next_page_token: Option<String>,
    pub page_info: PageInfo,
}

impl From<SearchListResponse> for SearchPage {
    fn from(response: SearchListResponse) -> Self {
        Self {
            items: response.items.into(),
            next_page_token: response.next_page_token,
            page_info: response.page_info,
        }
    }
}

/// A search result points at the video, channel or playlist that matched.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ResultId,
    pub snippet: VideoSnippet,
}

impl SearchResult {
    /// The matched video's ID, if the result is a video.
    pub fn video_id(&self) -> Option<&str> {
        self.id.video_id.as_deref()
    }
}

/// Identifies the resource behind a [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultId {
    /// The type of the matched resource, e.g. `youtube#video`.
    pub kind: String,
    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}
