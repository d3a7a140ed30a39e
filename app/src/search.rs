//! The search screen's state: the query box, the sort picker and the result list.
//!
//! [`SearchScreen`] holds no client. Callers ask it for the request to run
//! ([`SearchScreen::begin`]), run it however they like, and hand the outcome back
//! ([`SearchScreen::finish`]). Outcomes for a request that no longer matches the screen (the
//! query or sort order changed meanwhile) are dropped.

use crate::card::VideoCard;
use crate::youtube_api::{SearchPage, SearchRequest, SortOrder, YouTubeClient};
use jiff::tz::TimeZone;

/// Results fetched per search.
pub const SEARCH_PAGE_SIZE: u32 = 10;

pub const DEFAULT_SORT: SortOrder = SortOrder::ViewCount;

pub const NO_RESULTS: &str = "No videos found.";

/// How the sort bar names an order.
pub fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Date => "Latest",
        SortOrder::ViewCount => "Most popular",
        // the picker offers relevance as its "oldest first" choice
        SortOrder::Relevance => "Oldest",
    }
}

/// One row of the sort picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub label: &'static str,
    pub order: SortOrder,
}

pub const SORT_OPTIONS: [SortOption; 3] = [
    SortOption {
        label: "Upload date: latest",
        order: SortOrder::Date,
    },
    SortOption {
        label: "Upload date: oldest",
        order: SortOrder::Relevance,
    },
    SortOption {
        label: "Most popular",
        order: SortOrder::ViewCount,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// Nothing has been searched for yet.
    #[default]
    Idle,
    Loading,
    Loaded(Vec<VideoCard>),
}

#[derive(Debug, Clone)]
pub struct SearchScreen {
    input: String,
    submitted: Option<String>,
    order: SortOrder,
    /// The highlighted option while the picker is open.
    picker: Option<SortOrder>,
    status: SearchStatus,
    tz: TimeZone,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self::new(TimeZone::system())
    }
}

impl SearchScreen {
    pub fn new(tz: TimeZone) -> Self {
        Self {
            input: String::new(),
            submitted: None,
            order: DEFAULT_SORT,
            picker: None,
            status: SearchStatus::Idle,
            tz,
        }
    }

    /// Opens the screen for a query typed elsewhere (the home screen's search box).
    pub fn with_query(tz: TimeZone, query: &str) -> Self {
        let mut screen = Self::new(tz);
        screen.set_input(query);
        screen.submit();
        screen
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Makes the typed text the active query. Blank input is ignored.
    ///
    /// Returns whether there is a new query to search for.
    pub fn submit(&mut self) -> bool {
        let query = self.input.trim();
        if query.is_empty() || self.submitted.as_deref() == Some(query) {
            return false;
        }
        self.submitted = Some(query.to_string());
        self.status = SearchStatus::Idle;
        true
    }

    pub fn submitted_query(&self) -> Option<&str> {
        self.submitted.as_deref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// `Sort by: <label> ▾`
    pub fn sort_bar(&self) -> String {
        format!("Sort by: {} \u{25be}", sort_label(self.order))
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker.is_some()
    }

    /// The option highlighted in the open picker.
    pub fn picker_selection(&self) -> Option<SortOrder> {
        self.picker
    }

    pub fn open_sort_picker(&mut self) {
        self.picker = Some(self.order);
    }

    /// Highlights `order` in the open picker without applying it.
    pub fn select_sort(&mut self, order: SortOrder) {
        if let Some(pending) = &mut self.picker {
            *pending = order;
        }
    }

    /// Applies the highlighted order and closes the picker.
    ///
    /// Returns whether the order changed, in which case results must be fetched again.
    pub fn confirm_sort(&mut self) -> bool {
        let Some(pending) = self.picker.take() else {
            return false;
        };
        if pending == self.order {
            return false;
        }
        tracing::debug!(from = %self.order, to = %pending, "sort order changed");
        self.order = pending;
        if self.submitted.is_some() {
            self.status = SearchStatus::Idle;
        }
        true
    }

    /// Closes the picker, leaving the applied order as it was.
    pub fn cancel_sort(&mut self) {
        self.picker = None;
    }

    /// The request for the current query and order, if a query has been submitted.
    pub fn request(&self) -> Option<SearchRequest> {
        let query = self.submitted.as_deref()?;
        SearchRequest::builder()
            .query(query)
            .order(self.order)
            .max_results(SEARCH_PAGE_SIZE)
            .build()
            .map_err(|e| tracing::warn!(error = %e, "invalid search request"))
            .ok()
    }

    /// Marks a search as in flight and returns the request to run.
    pub fn begin(&mut self) -> Option<SearchRequest> {
        let request = self.request()?;
        self.status = SearchStatus::Loading;
        Some(request)
    }

    /// Records the outcome of `request`.
    ///
    /// A failed search shows as an empty result list. Outcomes for anything but the current
    /// query and order are ignored.
    pub fn finish(&mut self, request: &SearchRequest, outcome: eyre::Result<SearchPage>) {
        if self.request().as_ref() != Some(request) {
            tracing::debug!(query = request.query(), "dropping results for an outdated search");
            return;
        }
        let cards = match outcome {
            Ok(page) => VideoCard::from_results(&page.items, &self.tz),
            Err(e) => {
                tracing::warn!(query = request.query(), error = %e, "search failed");
                Vec::new()
            }
        };
        self.status = SearchStatus::Loaded(cards);
    }

    /// Runs the current search against `client`, if there is one to run.
    pub async fn refresh(&mut self, client: &YouTubeClient) {
        let Some(request) = self.begin() else {
            return;
        };
        let outcome = client.search(&request).await;
        self.finish(&request, outcome);
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn results(&self) -> &[VideoCard] {
        match &self.status {
            SearchStatus::Loaded(cards) => cards,
            _ => &[],
        }
    }

    /// The line above the results: progress while loading, else the result count.
    pub fn info_text(&self) -> Option<String> {
        let query = self.submitted.as_deref()?;
        Some(match &self.status {
            SearchStatus::Loading => "Searching...".to_string(),
            _ => format!("{} results found for: \"{}\"", self.results().len(), query),
        })
    }

    /// What to show in place of an empty result list.
    pub fn empty_text(&self) -> Option<&'static str> {
        match &self.status {
            SearchStatus::Loaded(cards) if cards.is_empty() => Some(NO_RESULTS),
            _ => None,
        }
    }
}
