//! A local stand-in for the YouTube Data API that serves canned JSON.

use crate::youtube_api::YouTubeClient;
use http_body_util::Full;
use hyper::body::{self, Bytes};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub(crate) const TEST_API_KEY: &str = "test-api-key";

/// One request as the fake API saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    /// Path relative to the API base, e.g. `search`.
    pub endpoint: String,
    pub params: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync;

pub(crate) struct FakeYouTube {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeYouTube {
    /// Serves every request with whatever `respond` returns for it.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((conn, _)) = socket.accept().await else {
                    return;
                };
                let conn = hyper_util::rt::TokioIo::new(conn);
                let recorded = Arc::clone(&recorded);
                let respond = Arc::clone(&respond);
                let service = service_fn(move |req: Request<body::Incoming>| {
                    let request = RecordedRequest {
                        endpoint: req.uri().path().trim_start_matches('/').to_string(),
                        params: form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
                            .into_owned()
                            .collect(),
                    };
                    let (status, body) = respond(&request);
                    recorded.lock().unwrap().push(request);
                    let mut response = Response::new(Full::<Bytes>::from(body));
                    *response.status_mut() = status;
                    async move { Ok::<_, Infallible>(response) }
                });
                tokio::spawn(async move {
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(conn, service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Serves `body` with a 200 for every request.
    pub async fn always(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::start(move |_| (StatusCode::OK, body.clone())).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> YouTubeClient {
        YouTubeClient::new(TEST_API_KEY, reqwest::Client::new()).with_base_url(self.base_url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// A `search.list` response body with one video result per `(id, title)` pair.
pub(crate) fn search_response(videos: &[(&str, &str)], next_page_token: Option<&str>) -> String {
    let items: Vec<serde_json::Value> = videos
        .iter()
        .map(|(id, title)| {
            serde_json::json!({
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": id },
                "snippet": {
                    "publishedAt": "2024-05-07T14:30:00Z",
                    "channelId": "UCchannel",
                    "title": title,
                    "description": "",
                    "thumbnails": {
                        "medium": { "url": format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg") },
                        "high": { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg") }
                    },
                    "channelTitle": "Some Channel",
                    "liveBroadcastContent": "none"
                }
            })
        })
        .collect();
    let mut response = serde_json::json!({
        "kind": "youtube#searchListResponse",
        "pageInfo": { "totalResults": videos.len(), "resultsPerPage": videos.len() },
        "items": items,
    });
    if let Some(token) = next_page_token {
        response["nextPageToken"] = token.into();
    }
    response.to_string()
}

pub(crate) fn video_response(id: &str, channel_id: &str) -> String {
    serde_json::json!({
        "kind": "youtube#videoListResponse",
        "pageInfo": { "totalResults": 1, "resultsPerPage": 1 },
        "items": [{
            "kind": "youtube#video",
            "id": id,
            "snippet": {
                "publishedAt": "2023-12-31T23:30:00Z",
                "channelId": channel_id,
                "title": "Rust in 100 seconds",
                "description": "Rust is a memory-safe compiled language.",
                "thumbnails": {
                    "high": { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg") },
                    "maxres": { "url": format!("https://i.ytimg.com/vi/{id}/maxresdefault.jpg") }
                },
                "channelTitle": "Fireship",
                "liveBroadcastContent": "none"
            },
            "statistics": { "viewCount": "25268952", "likeCount": "12345", "commentCount": "4000" }
        }]
    })
    .to_string()
}

pub(crate) fn channel_response(id: &str, title: &str) -> String {
    serde_json::json!({
        "kind": "youtube#channelListResponse",
        "pageInfo": { "totalResults": 1, "resultsPerPage": 5 },
        "items": [{
            "kind": "youtube#channel",
            "id": id,
            "snippet": {
                "title": title,
                "description": "High-intensity code tutorials",
                "thumbnails": { "default": { "url": "https://yt3.ggpht.com/avatar.jpg" } }
            }
        }]
    })
    .to_string()
}

pub(crate) fn empty_list(kind: &str) -> String {
    serde_json::json!({
        "kind": kind,
        "pageInfo": { "totalResults": 0, "resultsPerPage": 0 },
        "items": [],
    })
    .to_string()
}
