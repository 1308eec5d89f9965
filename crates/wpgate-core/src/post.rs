use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTML fragment in the self-hosted `{ "rendered": ... }` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
}

impl Rendered {
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }
}

impl From<Option<String>> for Rendered {
    fn from(value: Option<String>) -> Self {
        Self::new(value.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedMedia {
    pub source_url: String,
}

/// Synthesized `_embedded` wrapper, so the featured image is always at
/// `_embedded["wp:featuredmedia"][0].source_url` no matter the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Vec<FeaturedMedia>,
}

impl Embedded {
    pub fn from_image(featured_image: Option<&str>) -> Self {
        Self {
            featured_media: featured_image
                .map(|url| FeaturedMedia {
                    source_url: url.to_owned(),
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Canonical post, independent of the upstream flavor it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub date: String,
    /// Same as `date`; kept for time-ago formatting code that reads it.
    #[serde(rename = "postDate")]
    pub post_date: String,
    pub title: Rendered,
    pub excerpt: Rendered,
    pub content: Rendered,
    /// Either a URL or `null`, never missing.
    #[serde(rename = "featuredImage")]
    pub featured_image: Option<String>,
    #[serde(rename = "_embedded")]
    pub embedded: Embedded,
    pub categories: Value,
    pub tags: Value,
    pub author: Value,
}

/// One page of a listing together with the upstream's total count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub found: u64,
}

impl PostPage {
    /// `found` falls back to the page length when the upstream did not
    /// report a (non-zero) total.
    pub fn new(posts: Vec<Post>, found: Option<u64>) -> Self {
        let found = found
            .filter(|found| *found != 0)
            .unwrap_or(posts.len() as u64);
        Self { posts, found }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_is_empty_without_image() {
        assert!(Embedded::from_image(None).featured_media.is_empty());
        assert_eq!(
            Embedded::from_image(Some("https://img.example/a.jpg")).featured_media,
            vec![FeaturedMedia {
                source_url: "https://img.example/a.jpg".into()
            }]
        );
    }

    #[test]
    fn page_found_falls_back_to_len() {
        assert_eq!(PostPage::new(vec![], None).found, 0);
        assert_eq!(PostPage::new(vec![], Some(0)).found, 0);
        assert_eq!(PostPage::new(vec![], Some(42)).found, 42);
    }
}
