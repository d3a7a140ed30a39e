//! YouTube Data API v3 client library.
//!
//! Only the read-only, key-authorized corner of the API is covered: video search
//! ([`YouTubeClient::search`] and the paginated [`YouTubeClient::search_all`]) and metadata
//! lookups for single videos and channels.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use tubeview::youtube_api::{SearchRequest, SortOrder, YouTubeClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("AIza...", reqwest::Client::new());
//! let request = SearchRequest::builder()
//!     .query("typescript tutorial crash course")
//!     .order(SortOrder::ViewCount)
//!     .build()?;
//!
//! let mut results = std::pin::pin!(client.search_all(request));
//! while let Some(result) = results.next().await {
//!     let result = result?;
//!     println!("{} by {}", result.snippet.title, result.snippet.channel_title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod search;
pub mod types;
pub mod videos;

pub use client::YouTubeClient;
pub use types::{LiveBroadcastContent, PageInfo, PagedStream, Thumbnail, Thumbnails};

pub use channels::{Channel, ChannelSnippet};
pub use search::{SearchPage, SearchRequest, SearchRequestBuilder, SearchResult, SortOrder};
pub use videos::{Video, VideoSnippet, VideoStatistics};
