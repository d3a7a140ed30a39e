//! The YouTube Data API client.

use crate::config::{Config, DEFAULT_API_BASE};
use crate::youtube_api::{
    channels::{Channel, ChannelListResponse},
    search::{SearchListResponse, SearchPage, SearchRequest, SearchResult},
    types::PagedStream,
    videos::{Video, VideoListResponse},
};
use eyre::Context;
use http::Method;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::instrument;

/// Client for the public, read-only parts of the YouTube Data API v3.
///
/// Requests are authorized with an API key rather than OAuth, which is enough for searching and
/// for reading public video and channel metadata. The client is cheap to clone; clones share
/// the underlying connection pool.
#[derive(Clone)]
pub struct YouTubeClient {
    api_key: Arc<str>,
    base_url: Arc<str>,
    client: reqwest::Client,
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// The error document Google APIs return alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl YouTubeClient {
    /// Creates a client that talks to the public YouTube API with `api_key`.
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: Arc::from(api_key.into()),
            base_url: Arc::from(DEFAULT_API_BASE),
            client,
        }
    }

    /// Points the client at a different API root, such as a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = Arc::from(base_url.trim_end_matches('/'));
        self
    }

    /// Creates a client from the environment's configuration.
    ///
    /// Fails if no API key is configured.
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let api_key = config.api_key()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;
        Ok(Self::new(api_key, client).with_base_url(config.api_base()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request for `endpoint` (relative to the API root) and checks its status.
    ///
    /// The API key is appended to `query_params`. It is kept out of both the span and any
    /// transport error, since reqwest errors otherwise carry the full URL.
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    pub(crate) async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .request(method.clone(), &url)
            .query(query_params)
            .query(&[("key", &*self.api_key)])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("send {} request to YouTube API: {}", method, endpoint))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(eyre::eyre!(
                "YouTube API {} {} request failed with status {}: {}",
                method,
                endpoint,
                status_code,
                message
            ));
        }

        Ok(response)
    }

    /// Fetches one page of video search results.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self, request), fields(query = request.query(), order = ?request.order()))]
    pub async fn search(&self, request: &SearchRequest) -> eyre::Result<SearchPage> {
        let params = request.query_params();
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = self.make_request(Method::GET, "search", &params).await?;
        let results: SearchListResponse = response
            .json()
            .await
            .context("parse YouTube search API response as JSON")?;

        tracing::debug!(
            total_results = results.page_info.total_results,
            returned_items = results.items.len(),
            has_next_page = results.next_page_token.is_some(),
            "fetched search results"
        );

        Ok(results.into())
    }

    /// Returns a paginated stream over every result of a search.
    ///
    /// The stream starts at the request's page token (if any) and fetches subsequent pages as
    /// the previous one is consumed. YouTube caps how deep a search can be paged, so the stream
    /// ends after a few hundred results at most.
    #[instrument(skip(self))]
    pub fn search_all(
        &self,
        request: SearchRequest,
    ) -> impl Stream<Item = eyre::Result<SearchResult>> + use<'_> {
        PagedStream::new(move |page_token| {
            let request = match page_token {
                Some(token) => request.at_page(Some(token)),
                None => request.clone(),
            };
            async move {
                let page = self.search(&request).await?;
                Ok((VecDeque::from(page.items), page.next_page_token))
            }
        })
    }

    /// Fetches a video's snippet and statistics.
    ///
    /// Returns `None` if no video has that ID (or it is private).
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn get_video(&self, video_id: &str) -> eyre::Result<Option<Video>> {
        let query_params = [("part", "snippet,statistics"), ("id", video_id)];

        let response = self
            .make_request(Method::GET, "videos", &query_params)
            .await?;
        let videos: VideoListResponse = response
            .json()
            .await
            .context("parse YouTube videos API response as JSON")?;

        tracing::debug!(
            video_id,
            returned_items = videos.items.len(),
            "fetched video details"
        );

        Ok(videos.items.into_iter().next())
    }

    /// Fetches a channel's snippet.
    ///
    /// Returns `None` if no channel has that ID.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn get_channel(&self, channel_id: &str) -> eyre::Result<Option<Channel>> {
        let query_params = [("part", "snippet"), ("id", channel_id)];

        let response = self
            .make_request(Method::GET, "channels", &query_params)
            .await?;
        let channels: ChannelListResponse = response
            .json()
            .await
            .context("parse YouTube channels API response as JSON")?;

        tracing::debug!(
            channel_id,
            returned_items = channels.items.len(),
            "fetched channel details"
        );

        Ok(channels.items.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FakeYouTube, TEST_API_KEY, channel_response, empty_list, search_response, video_response,
    };
    use crate::youtube_api::search::SortOrder;
    use hyper::StatusCode;
    use pretty_assertions::assert_eq;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn search_sends_the_expected_query() {
        let api = FakeYouTube::always(search_response(&[("a1", "First"), ("b2", "Second")], None))
            .await;
        let request = SearchRequest::builder()
            .query("react native tutorial project")
            .order(SortOrder::Date)
            .max_results(6)
            .build()
            .unwrap();

        let page = api.client().search(&request).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].snippet.title, "Second");
        assert_eq!(page.next_page_token, None);

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.endpoint, "search");
        assert_eq!(sent.param("part"), Some("snippet"));
        assert_eq!(sent.param("type"), Some("video"));
        assert_eq!(sent.param("maxResults"), Some("6"));
        assert_eq!(sent.param("q"), Some("react native tutorial project"));
        assert_eq!(sent.param("order"), Some("date"));
        assert_eq!(sent.param("key"), Some(TEST_API_KEY));
        assert_eq!(sent.param("pageToken"), None);
    }

    #[tokio::test]
    async fn search_all_follows_page_tokens() {
        let api = FakeYouTube::start(|request| {
            let body = match request.param("pageToken") {
                None => search_response(&[("v1", "one"), ("v2", "two")], Some("PAGE2")),
                Some("PAGE2") => search_response(&[("v3", "three")], None),
                Some(other) => panic!("unexpected page token {other}"),
            };
            (StatusCode::OK, body)
        })
        .await;
        let client = api.client();
        let request = SearchRequest::builder().query("rust").build().unwrap();

        let ids: Vec<String> = client
            .search_all(request)
            .map(|result| result.unwrap().video_id().unwrap().to_string())
            .collect()
            .await;
        assert_eq!(ids, vec!["v1", "v2", "v3"]);
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn get_video_requests_snippet_and_statistics() {
        let api = FakeYouTube::always(video_response("vid1", "UCfire")).await;
        let video = api.client().get_video("vid1").await.unwrap().unwrap();
        assert_eq!(video.id, "vid1");
        assert_eq!(video.snippet.channel_id, "UCfire");
        assert_eq!(video.statistics.views(), Some(25_268_952));

        let sent = &api.requests()[0];
        assert_eq!(sent.endpoint, "videos");
        assert_eq!(sent.param("part"), Some("snippet,statistics"));
        assert_eq!(sent.param("id"), Some("vid1"));
    }

    #[tokio::test]
    async fn unknown_ids_are_none() {
        let api = FakeYouTube::start(|request| {
            let kind = if request.endpoint == "videos" {
                "youtube#videoListResponse"
            } else {
                "youtube#channelListResponse"
            };
            (StatusCode::OK, empty_list(kind))
        })
        .await;
        let client = api.client();
        assert!(client.get_video("nope").await.unwrap().is_none());
        assert!(client.get_channel("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_channel_parses_the_snippet() {
        let api = FakeYouTube::always(channel_response("UCfire", "Fireship")).await;
        let channel = api.client().get_channel("UCfire").await.unwrap().unwrap();
        assert_eq!(channel.snippet.title, "Fireship");
        assert_eq!(api.requests()[0].param("part"), Some("snippet"));
    }

    #[tokio::test]
    async fn error_statuses_carry_the_api_message() {
        let api = FakeYouTube::start(|_| {
            (
                StatusCode::FORBIDDEN,
                r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota."}}"#
                    .to_string(),
            )
        })
        .await;
        let err = api.client().get_video("vid1").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"), "{message}");
        assert!(message.contains("exceeded your quota"), "{message}");
        assert!(!message.contains(TEST_API_KEY), "{message}");
    }

    #[tokio::test]
    async fn non_json_error_bodies_are_passed_through() {
        let api =
            FakeYouTube::start(|_| (StatusCode::BAD_GATEWAY, "upstream hiccup".to_string())).await;
        let request = SearchRequest::builder().query("x").build().unwrap();
        let err = api.client().search(&request).await.unwrap_err();
        assert!(err.to_string().contains("upstream hiccup"), "{err}");
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_key() {
        // nothing listens on port 9 of localhost
        let client = YouTubeClient::new(TEST_API_KEY, reqwest::Client::new())
            .with_base_url("http://127.0.0.1:9");
        let err = client.get_channel("UC1").await.unwrap_err();
        let report = format!("{err:?}");
        assert!(!report.contains(TEST_API_KEY), "{report}");
    }

    #[test]
    fn from_config_requires_a_key() {
        assert!(YouTubeClient::from_config(&Config::default()).is_err());
        let client = YouTubeClient::from_config(
            &Config::default()
                .with_api_key("k")
                .with_api_base("http://localhost:1234/v3/"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v3");
        assert!(!format!("{client:?}").contains("\"k\""));
    }
}
