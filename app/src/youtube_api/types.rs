//! Types shared between the YouTube API resources, plus page-by-page streaming of list results.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// One page of results: the items, and the token for the page after it (if any).
pub type Page<T> = (VecDeque<T>, Option<String>);

type PendingPage<'a, F, T> = Pin<Box<dyn Future<Output = eyre::Result<(F, Page<T>)>> + Send + 'a>>;

enum Fetch<'a, T, F> {
    /// A request for the next page is in flight.
    InFlight(PendingPage<'a, F, T>),
    /// The last page has been received (or a request failed).
    Exhausted,
}

/// A stream over every item of a paginated YouTube list endpoint.
///
/// Pages are requested lazily: the next one is only fetched once every item of the current page
/// has been yielded. An error ends the stream after it has been yielded.
pub struct PagedStream<'a, T, F> {
    buffered: VecDeque<T>,
    fetch: Fetch<'a, T, F>,
}

impl<'a, T, F, Fut> PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    /// Creates a stream whose pages are produced by `fetcher`.
    ///
    /// `fetcher` is called with `None` for the first page and with the previous page's token for
    /// each page after that.
    pub fn new(fetcher: F) -> Self {
        Self {
            buffered: VecDeque::new(),
            fetch: Fetch::InFlight(Self::request(fetcher, None)),
        }
    }

    fn request(fetcher: F, page_token: Option<String>) -> PendingPage<'a, F, T> {
        Box::pin(async move {
            let page = fetcher(page_token).await?;
            Ok((fetcher, page))
        })
    }
}

impl<T: Unpin, F> Unpin for PagedStream<'_, T, F> {}

impl<'a, T, F, Fut> Stream for PagedStream<'a, T, F>
where
    T: Unpin,
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            let Fetch::InFlight(pending) = &mut self.fetch else {
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    self.fetch = Fetch::Exhausted;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Ok((fetcher, (items, next_page_token)))) => {
                    self.buffered.extend(items);
                    self.fetch = match next_page_token {
                        Some(token) => Fetch::InFlight(Self::request(fetcher, Some(token))),
                        None => Fetch::Exhausted,
                    };
                    // an empty page with a next token just moves on to the next request
                }
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set (an approximation for searches).
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}

/// A single image of a [`Thumbnails`] set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The thumbnail images associated with a video or channel, keyed by size.
///
/// Not every size exists for every resource: `standard` and `maxres` are only present for
/// videos whose uploads were large enough, and channels never have them.
///
/// See: <https://developers.google.com/youtube/v3/docs/thumbnails>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// The largest image available, for use as a player poster.
    pub fn largest(&self) -> Option<&Thumbnail> {
        self.maxres
            .as_ref()
            .or(self.standard.as_ref())
            .or(self.high.as_ref())
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }

    /// The image used on list cards: `high` if there is one, else the next size down.
    pub fn for_card(&self) -> Option<&Thumbnail> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

/// Whether a video is a live broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveBroadcastContent {
    #[default]
    None,
    Upcoming,
    Live,
    #[serde(other)]
    Other,
}
