//! Raw upstream shapes and their normalization into the canonical model.
//!
//! Each flavor gets its own record types and exactly one conversion into
//! [`Post`] / [`RemoteComment`]; nothing outside this module needs to know
//! which one it is looking at.

use std::fmt;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::comment::RemoteComment;
use crate::image;
use crate::post::{Embedded, Post, Rendered};

/// Which WordPress REST API a site speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// `https://public-api.wordpress.com/rest/v1.1/sites/<site>`
    DotCom,
    /// `https://<site>/wp-json/wp/v2`
    SelfHosted,
}

impl Flavor {
    /// Guess the flavor from an API base URL.
    pub fn detect(base_url: &str) -> Self {
        if base_url.contains("/rest/v1.1/sites/") || base_url.contains("/rest/v1/sites/") {
            Flavor::DotCom
        } else {
            Flavor::SelfHosted
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::DotCom => f.write_str("wordpress.com"),
            Flavor::SelfHosted => f.write_str("self-hosted"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderedField {
    #[serde(default)]
    pub rendered: Option<String>,
}

/// Post as served by `wp/v2` (with `_embed`).
#[derive(Debug, Clone, Deserialize)]
pub struct SelfHostedPost {
    #[serde(alias = "ID", deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: Option<RenderedField>,
    #[serde(default)]
    pub excerpt: Option<RenderedField>,
    #[serde(default)]
    pub content: Option<RenderedField>,
    #[serde(default)]
    pub jetpack_featured_media_url: Option<String>,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<Value>,
    #[serde(default)]
    pub categories: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
}

impl SelfHostedPost {
    fn embedded_image(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .get("wp:featuredmedia")?
            .get(0)?
            .get("source_url")?
            .as_str()
    }
}

/// Post as served by the WordPress.com v1.1 API.
#[derive(Debug, Clone, Deserialize)]
pub struct DotComPost {
    #[serde(rename = "ID", alias = "id", deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    /// Keyed by attachment id; an empty PHP array when there are none
    pub attachments: Option<Value>,
    #[serde(default)]
    pub categories: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
}

/// Post ids are numbers, but some sites send them as numeric strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&text), &"a numeric id")),
    }
}

#[derive(Debug, Clone)]
pub enum UpstreamPost {
    SelfHosted(SelfHostedPost),
    DotCom(DotComPost),
}

impl UpstreamPost {
    pub fn from_value(flavor: Flavor, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match flavor {
            Flavor::SelfHosted => UpstreamPost::SelfHosted(serde_json::from_value(value)?),
            Flavor::DotCom => UpstreamPost::DotCom(serde_json::from_value(value)?),
        })
    }

    pub fn normalize(self) -> Post {
        match self {
            UpstreamPost::SelfHosted(post) => normalize_self_hosted(post),
            UpstreamPost::DotCom(post) => normalize_dot_com(post),
        }
    }
}

fn rendered(field: Option<RenderedField>) -> Rendered {
    Rendered::from(field.and_then(|field| field.rendered))
}

fn passthrough(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    }
}

fn normalize_self_hosted(post: SelfHostedPost) -> Post {
    let explicit = post
        .embedded_image()
        .or(post.jetpack_featured_media_url.as_deref())
        .map(ToOwned::to_owned);
    let content = rendered(post.content);
    let featured_image =
        image::resolve_featured_image(explicit.as_deref(), None, Some(&content.rendered));

    Post {
        id: post.id,
        slug: post.slug,
        post_date: post.date.clone(),
        date: post.date,
        title: rendered(post.title),
        excerpt: rendered(post.excerpt),
        content,
        embedded: Embedded::from_image(featured_image.as_deref()),
        featured_image,
        categories: passthrough(post.categories),
        tags: passthrough(post.tags),
        author: passthrough(post.author),
    }
}

fn normalize_dot_com(post: DotComPost) -> Post {
    let featured_image = image::resolve_featured_image(
        post.featured_image.as_deref(),
        post.attachments.as_ref().and_then(Value::as_object),
        post.content.as_deref(),
    );

    Post {
        id: post.id,
        slug: post.slug,
        post_date: post.date.clone(),
        date: post.date,
        title: Rendered::from(post.title),
        excerpt: Rendered::from(post.excerpt),
        content: Rendered::from(post.content),
        embedded: Embedded::from_image(featured_image.as_deref()),
        featured_image,
        categories: passthrough(post.categories),
        tags: passthrough(post.tags),
        author: passthrough(post.author),
    }
}

/// Comment as served by `wp/v2/comments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfHostedComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<RenderedField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum DotComAuthor {
    Named {
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
    #[default]
    Unknown,
}

impl DotComAuthor {
    fn into_name(self) -> Option<String> {
        match self {
            DotComAuthor::Named { name } => name,
            DotComAuthor::Plain(name) => Some(name),
            DotComAuthor::Unknown => None,
        }
    }
}

/// Comment as served by the WordPress.com replies endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DotComComment {
    #[serde(default, rename = "ID")]
    pub id: Option<u64>,
    #[serde(default)]
    pub author: Option<DotComAuthor>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub enum UpstreamComment {
    SelfHosted(SelfHostedComment),
    DotCom(DotComComment),
}

impl UpstreamComment {
    pub fn from_value(flavor: Flavor, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match flavor {
            Flavor::SelfHosted => UpstreamComment::SelfHosted(serde_json::from_value(value)?),
            Flavor::DotCom => UpstreamComment::DotCom(serde_json::from_value(value)?),
        })
    }

    /// Normalize, taking any field the upstream left out from `fallback`.
    pub fn into_remote(self, fallback: RemoteComment) -> RemoteComment {
        let (id, author_name, date, content) = match self {
            UpstreamComment::SelfHosted(c) => (
                c.id,
                c.author_name,
                c.date,
                c.content.and_then(|c| c.rendered),
            ),
            UpstreamComment::DotCom(c) => (
                c.id,
                c.author.and_then(DotComAuthor::into_name),
                c.date,
                c.content,
            ),
        };

        RemoteComment {
            id: id.unwrap_or(fallback.id),
            author_name: author_name
                .filter(|name| !name.is_empty())
                .unwrap_or(fallback.author_name),
            date: date.filter(|d| !d.is_empty()).unwrap_or(fallback.date),
            content: content.map(Rendered::new).unwrap_or(fallback.content),
            remote: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test_log::test]
    fn detects_flavor() {
        assert_eq!(
            Flavor::detect("https://public-api.wordpress.com/rest/v1.1/sites/news.example"),
            Flavor::DotCom
        );
        assert_eq!(
            Flavor::detect("https://news.example/wp-json/wp/v2"),
            Flavor::SelfHosted
        );
    }

    #[test_log::test]
    fn normalizes_dot_com_post() {
        let raw = json!({
            "ID": 12,
            "slug": "hello",
            "date": "2024-01-01T10:00:00+00:00",
            "title": "Hello",
            "content": "<p>body</p><img src=\"https://img.example/inline.jpg\">",
            "featured_image": "",
            "attachments": { "3": { "URL": "https://img.example/att.jpg" } },
            "categories": { "Tech": { "ID": 31554 } },
        });
        let post = UpstreamPost::from_value(Flavor::DotCom, raw)
            .unwrap()
            .normalize();

        assert_eq!(post.id, 12);
        assert_eq!(post.title.rendered, "Hello");
        assert_eq!(post.excerpt.rendered, "");
        assert_eq!(post.post_date, post.date);
        assert_eq!(
            post.featured_image.as_deref(),
            Some("https://img.example/att.jpg")
        );
        assert_eq!(
            post.embedded.featured_media[0].source_url,
            "https://img.example/att.jpg"
        );
        assert_eq!(post.tags, json!({}));
        assert_eq!(post.author, json!({}));
    }

    #[test_log::test]
    fn dot_com_post_tolerates_php_shapes() {
        let post = UpstreamPost::from_value(
            Flavor::DotCom,
            json!({
                "ID": "12",
                "slug": "a",
                "title": "T",
                "attachments": [],
                "content": "<img src=\"https://img.example/inline.jpg\">",
            }),
        )
        .unwrap()
        .normalize();
        assert_eq!(post.id, 12);
        assert_eq!(
            post.featured_image.as_deref(),
            Some("https://img.example/inline.jpg")
        );

        let post = UpstreamPost::from_value(Flavor::DotCom, json!({ "id": 7, "slug": "b" }))
            .unwrap()
            .normalize();
        assert_eq!(post.id, 7);

        assert!(UpstreamPost::from_value(Flavor::DotCom, json!({ "ID": "seven" })).is_err());
    }

    #[test_log::test]
    fn normalizes_self_hosted_post() {
        let raw = json!({
            "id": 99,
            "slug": "world-news",
            "date": "2024-02-02T08:00:00",
            "title": { "rendered": "World &amp; more" },
            "excerpt": { "rendered": "<p>short</p>" },
            "content": { "rendered": "<p>long</p>" },
            "categories": [31563],
            "_embedded": {
                "wp:featuredmedia": [{ "source_url": "https://img.example/world.jpg" }]
            }
        });
        let post = UpstreamPost::from_value(Flavor::SelfHosted, raw)
            .unwrap()
            .normalize();

        assert_eq!(post.id, 99);
        assert_eq!(post.title.rendered, "World &amp; more");
        assert_eq!(
            post.featured_image.as_deref(),
            Some("https://img.example/world.jpg")
        );
        assert_eq!(post.categories, json!([31563]));
    }

    #[test_log::test]
    fn missing_fields_become_empty_strings_and_null_image() {
        let post = UpstreamPost::from_value(
            Flavor::SelfHosted,
            json!({ "id": 1, "title": null, "content": {} }),
        )
        .unwrap()
        .normalize();

        assert_eq!(post.title.rendered, "");
        assert_eq!(post.content.rendered, "");
        assert_eq!(post.excerpt.rendered, "");
        assert_eq!(post.featured_image, None);

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["featuredImage"], Value::Null);
        assert_eq!(value["_embedded"]["wp:featuredmedia"], json!([]));
    }

    #[test_log::test]
    fn dot_com_comment_uses_fallbacks() {
        let fallback = RemoteComment {
            id: 5,
            author_name: "Asha".into(),
            date: "2024-01-01T00:00:00Z".into(),
            content: Rendered::new("typed text"),
            remote: true,
        };

        let full = UpstreamComment::from_value(
            Flavor::DotCom,
            json!({
                "ID": 77,
                "author": { "name": "Asha K" },
                "date": "2024-01-02T00:00:00+00:00",
                "content": "<p>typed text</p>",
            }),
        )
        .unwrap()
        .into_remote(fallback.clone());
        assert_eq!(full.id, 77);
        assert_eq!(full.author_name, "Asha K");
        assert_eq!(full.content.rendered, "<p>typed text</p>");

        let empty = UpstreamComment::from_value(Flavor::DotCom, json!({}))
            .unwrap()
            .into_remote(fallback.clone());
        assert_eq!(empty, fallback);
    }
}
