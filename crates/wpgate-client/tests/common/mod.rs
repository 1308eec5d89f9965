#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;
use wpgate_client::error::{TransportError, TransportResult};
use wpgate_client::{Gateway, Transport, UpstreamResponse};
use wpgate_store::{KvStore, MemoryStore, StoreError, StoreResult};

pub const DOT_COM_BASE: &str = "https://public-api.wordpress.com/rest/v1.1/sites/news.example";
pub const SELF_HOSTED_BASE: &str = "https://news.example/wp-json/wp/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl Request {
    pub fn query(&self, key: &str) -> Option<String> {
        query(&self.url, key)
    }
}

type Matcher = Box<dyn Fn(&Url) -> bool + Send + Sync>;

struct Route {
    method: Method,
    matcher: Matcher,
    response: UpstreamResponse,
}

/// Scripted upstream: the first matching route answers, anything else is a
/// 404. Every request is recorded.
#[derive(Default)]
pub struct FakeTransport {
    routes: Vec<Route>,
    unreachable: bool,
    requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails as if the network was down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn on_get(
        mut self,
        matcher: impl Fn(&Url) -> bool + Send + Sync + 'static,
        response: UpstreamResponse,
    ) -> Self {
        self.routes.push(Route {
            method: Method::Get,
            matcher: Box::new(matcher),
            response,
        });
        self
    }

    pub fn on_post(
        mut self,
        matcher: impl Fn(&Url) -> bool + Send + Sync + 'static,
        response: UpstreamResponse,
    ) -> Self {
        self.routes.push(Route {
            method: Method::Post,
            matcher: Box::new(matcher),
            response,
        });
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn handle(&self, method: Method, url: &Url, body: Option<&Value>) -> TransportResult<UpstreamResponse> {
        self.requests.lock().unwrap().push(Request {
            method,
            url: url.clone(),
            body: body.cloned(),
        });

        if self.unreachable {
            return Err(TransportError::Http {
                url: url.to_string(),
                source: Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable")),
            });
        }

        Ok(self
            .routes
            .iter()
            .find(|route| route.method == method && (route.matcher)(url))
            .map(|route| route.response.clone())
            .unwrap_or_else(|| UpstreamResponse::status(404)))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url) -> TransportResult<UpstreamResponse> {
        self.handle(Method::Get, url, None)
    }

    async fn post_json(&self, url: &Url, body: &Value) -> TransportResult<UpstreamResponse> {
        self.handle(Method::Post, url, Some(body))
    }
}

/// A store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl KvStore for BrokenStore {
    async fn read(&self, _key: &str) -> StoreResult<Option<Value>> {
        Err(StoreError::Unavailable)
    }

    async fn write(&self, _key: &str, _value: &Value) -> StoreResult<()> {
        Err(StoreError::Unavailable)
    }
}

pub fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn has_query(url: &Url, key: &str, value: &str) -> bool {
    query(url, key).as_deref() == Some(value)
}

/// Listing endpoint whose query has every `(key, value)` pair.
pub fn posts_where(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&Url) -> bool {
    move |url| {
        url.path().ends_with("/posts")
            && pairs.iter().all(|(key, value)| has_query(url, key, value))
    }
}

pub fn path_ends_with(suffix: &'static str) -> impl Fn(&Url) -> bool {
    move |url| url.path().ends_with(suffix)
}

pub fn gateway(base: &str, transport: Arc<FakeTransport>) -> Gateway {
    gateway_with_store(base, transport, Arc::new(MemoryStore::new()))
}

pub fn gateway_with_store(
    base: &str,
    transport: Arc<FakeTransport>,
    store: Arc<dyn KvStore>,
) -> Gateway {
    Gateway::builder()
        .base_url(base)
        .transport(transport)
        .store(store)
        .build()
        .expect("valid base url")
}

pub fn dot_com_post(id: u64, slug: &str) -> Value {
    json!({
        "ID": id,
        "slug": slug,
        "date": "2024-03-01T10:00:00+00:00",
        "title": format!("Post {id}"),
        "excerpt": "<p>Excerpt</p>",
        "content": "<p>Body</p>",
    })
}

pub fn self_hosted_post(id: u64, slug: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "date": "2024-03-01T10:00:00",
        "title": { "rendered": format!("Post {id}") },
        "excerpt": { "rendered": "<p>Excerpt</p>" },
        "content": { "rendered": "<p>Body</p>" },
    })
}

pub fn dot_com_listing(posts: Vec<Value>) -> UpstreamResponse {
    UpstreamResponse::ok(json!({ "found": posts.len(), "posts": posts }))
}

pub fn empty_dot_com_listing() -> UpstreamResponse {
    dot_com_listing(vec![])
}
