//! The home screen: a fixed set of topic rows, each filled by its own search.

use crate::card::VideoCard;
use crate::youtube_api::{SearchRequest, YouTubeClient};
use eyre::Context;
use jiff::tz::TimeZone;
use tokio::task::JoinSet;
use tracing::instrument;

/// Videos shown per row.
pub const SECTION_SIZE: u32 = 6;

/// A titled row of the home screen and the search that fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSection {
    pub title: &'static str,
    pub query: &'static str,
}

pub const HOME_SECTIONS: [FeedSection; 4] = [
    FeedSection {
        title: "JavaScript",
        query: "javascript news tutorial",
    },
    FeedSection {
        title: "React",
        query: "reactjs tutorial course",
    },
    FeedSection {
        title: "React Native",
        query: "react native tutorial project",
    },
    FeedSection {
        title: "TypeScript",
        query: "typescript tutorial crash course",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSection {
    pub title: &'static str,
    pub cards: Vec<VideoCard>,
    /// The row's search failed; it is shown empty.
    pub failed: bool,
}

async fn load_section(
    client: &YouTubeClient,
    section: FeedSection,
    tz: &TimeZone,
) -> eyre::Result<Vec<VideoCard>> {
    let request = SearchRequest::builder()
        .query(section.query)
        .max_results(SECTION_SIZE)
        .build()
        .context("build section search")?;
    let page = client.search(&request).await?;
    Ok(VideoCard::from_results(&page.items, tz))
}

/// Loads every section concurrently.
///
/// The result is in the order of `sections`. A section whose search fails is logged and comes
/// back empty; the others are unaffected.
#[instrument(skip_all, fields(sections = sections.len()))]
pub async fn load_sections(
    client: &YouTubeClient,
    sections: &[FeedSection],
    tz: &TimeZone,
) -> Vec<LoadedSection> {
    let mut loaded: Vec<LoadedSection> = sections
        .iter()
        .map(|section| LoadedSection {
            title: section.title,
            cards: Vec::new(),
            failed: true,
        })
        .collect();

    let mut tasks = JoinSet::new();
    for (index, &section) in sections.iter().enumerate() {
        let client = client.clone();
        let tz = tz.clone();
        tasks.spawn(async move { (index, load_section(&client, section, &tz).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(cards))) => {
                tracing::debug!(section = loaded[index].title, videos = cards.len(), "section loaded");
                loaded[index].cards = cards;
                loaded[index].failed = false;
            }
            Ok((index, Err(e))) => {
                tracing::warn!(section = loaded[index].title, error = %e, "could not load section");
            }
            Err(e) => {
                tracing::error!(error = %e, "section task panicked");
            }
        }
    }

    loaded
}

/// Loads the four home screen rows.
pub async fn load_home_feed(client: &YouTubeClient, tz: &TimeZone) -> Vec<LoadedSection> {
    load_sections(client, &HOME_SECTIONS, tz).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeYouTube, search_response};
    use hyper::StatusCode;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn loads_every_section_in_order() {
        let api = FakeYouTube::start(|request| {
            let query = request.param("q").unwrap_or_default();
            let id = query.split(' ').next().unwrap_or_default().to_string();
            (StatusCode::OK, search_response(&[(id.as_str(), query)], None))
        })
        .await;

        let sections = load_home_feed(&api.client(), &TimeZone::UTC).await;
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["JavaScript", "React", "React Native", "TypeScript"]);
        let first_ids: Vec<_> = sections
            .iter()
            .map(|s| s.cards[0].video_id.as_str())
            .collect();
        assert_eq!(first_ids, vec!["javascript", "reactjs", "react", "typescript"]);
        assert!(sections.iter().all(|s| !s.failed));

        let requests = api.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|r| r.param("maxResults") == Some("6")));
        assert!(requests.iter().all(|r| r.param("order").is_none()));
    }

    #[tokio::test]
    async fn a_failing_section_is_left_empty() {
        let api = FakeYouTube::start(|request| {
            if request.param("q") == Some("reactjs tutorial course") {
                (StatusCode::INTERNAL_SERVER_ERROR, "backend error".to_string())
            } else {
                (StatusCode::OK, search_response(&[("v", "video")], None))
            }
        })
        .await;

        let sections = load_home_feed(&api.client(), &TimeZone::UTC).await;
        assert_eq!(sections.len(), 4);
        assert!(sections[1].failed);
        assert!(sections[1].cards.is_empty());
        for index in [0, 2, 3] {
            assert!(!sections[index].failed);
            assert_eq!(sections[index].cards.len(), 1);
        }
    }
}
