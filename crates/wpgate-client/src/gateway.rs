use std::borrow::Cow;
use std::sync::Arc;

use snafu::{OptionExt as _, ResultExt as _};
use tracing::{debug, warn};
use wpgate_core::category::{TRENDING_SLUG, section_by_id};
use wpgate_core::{Flavor, Post, PostPage};
use wpgate_store::KvStore;

use crate::LOG_TARGET;
use crate::error::{
    EmptySlugSnafu, FetchSnafu, InitResult, NotFoundSnafu, PostLookupResult, TransportResult,
};
use crate::filter::{CategoryRef, PostFilter};
use crate::transport::Transport;
use crate::upstream::{ListQuery, Taxonomy, Upstream};

/// Store key holding the array of comments that never reached the upstream.
pub const DEFAULT_COMMENTS_KEY: &str = "wpgate.comments";

pub struct Gateway {
    pub(crate) upstream: Upstream,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) comments_key: String,
}

#[bon::bon]
impl Gateway {
    #[builder(finish_fn(name = "build"))]
    pub fn new(
        #[builder(into)] base_url: String,
        // detected from `base_url` when not set
        flavor: Option<Flavor>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KvStore>,
        #[builder(into, default = DEFAULT_COMMENTS_KEY.to_owned())] comments_key: String,
    ) -> InitResult<Self> {
        let upstream = Upstream::new(&base_url, flavor)?;
        debug!(
            target: LOG_TARGET,
            base = %upstream.base(),
            flavor = %upstream.flavor(),
            "Content gateway"
        );

        Ok(Self {
            upstream,
            transport,
            store,
            comments_key,
        })
    }
}

impl Gateway {
    pub fn flavor(&self) -> Flavor {
        self.upstream.flavor()
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Posts matching `filter`.
    ///
    /// On WordPress.com a numeric category that yields nothing is retried
    /// once as the tag of the built-in section with that id (except
    /// `trending`, which has no tag). Failures come back empty.
    pub async fn get_posts(&self, filter: &PostFilter) -> Vec<Post> {
        let page = match self.list(filter).await {
            Ok(page) => page,
            Err(err) => {
                warn!(target: LOG_TARGET, err = %err, ?filter, "Failed to fetch posts");
                return vec![];
            }
        };

        if !page.is_empty() || filter.tag.is_some() || self.flavor() != Flavor::DotCom {
            return page.posts;
        }
        let Some(CategoryRef::Id(id)) = filter.category else {
            return page.posts;
        };
        let Some(section) = section_by_id(id).filter(|s| s.slug != TRENDING_SLUG) else {
            return page.posts;
        };

        debug!(target: LOG_TARGET, id, tag = section.slug, "No posts in category, retrying as tag");
        let retry = PostFilter {
            category: None,
            tag: Some(section.slug.to_owned()),
            ..filter.clone()
        };
        self.try_list(&retry).await.posts
    }

    /// Single post by slug. The slug is passed on as given.
    pub async fn get_post_by_slug(&self, slug: &str) -> PostLookupResult<Post> {
        if slug.trim().is_empty() {
            return EmptySlugSnafu.fail();
        }

        let url = self
            .upstream
            .post_by_slug_url(slug)
            .context(FetchSnafu { slug })?;
        let resp = self
            .transport
            .get(&url)
            .await
            .context(FetchSnafu { slug })?;
        if resp.status == 404 {
            return NotFoundSnafu { slug }.fail();
        }
        let resp = resp.ensure_success(&url).context(FetchSnafu { slug })?;

        let post = self
            .upstream
            .parse_single_post(resp)
            .context(NotFoundSnafu { slug })?;

        if !same_slug(&post.slug, slug) {
            debug!(target: LOG_TARGET, wanted = slug, got = %post.slug, "Upstream returned a different post");
            return NotFoundSnafu { slug }.fail();
        }
        Ok(post)
    }

    /// Full-text search; a blank query returns nothing without asking the
    /// upstream.
    pub async fn search_posts(&self, query: &str, filter: &PostFilter) -> Vec<Post> {
        let query = query.trim();
        if query.is_empty() {
            return vec![];
        }
        self.get_posts(&filter.clone().search(query)).await
    }

    /// One page of posts, in the upstream's own pagination.
    pub(crate) async fn list(&self, filter: &PostFilter) -> TransportResult<PostPage> {
        let Some(query) = self.list_query(filter).await else {
            return Ok(PostPage::default());
        };
        self.fetch_page(&query).await
    }

    pub(crate) async fn try_list(&self, filter: &PostFilter) -> PostPage {
        self.list(filter).await.unwrap_or_else(|err| {
            warn!(target: LOG_TARGET, err = %err, ?filter, "Failed to fetch posts");
            PostPage::default()
        })
    }

    async fn fetch_page(&self, query: &ListQuery) -> TransportResult<PostPage> {
        let url = self.upstream.list_posts_url(query)?;
        let resp = self.transport.get(&url).await?.ensure_success(&url)?;
        Ok(self.upstream.parse_post_page(resp))
    }

    /// Translate `filter` into the upstream's terms.
    ///
    /// `None` when a slug filter names a term the upstream doesn't have, so
    /// nothing can match.
    async fn list_query(&self, filter: &PostFilter) -> Option<ListQuery> {
        let (category, tag) = match self.upstream.flavor() {
            Flavor::DotCom => (
                filter.category.as_ref().map(ToString::to_string),
                filter.tag.clone(),
            ),
            Flavor::SelfHosted => {
                let category = match &filter.category {
                    None => None,
                    Some(CategoryRef::Id(id)) => Some(id.to_string()),
                    Some(CategoryRef::Slug(slug)) => Some(
                        self.resolve_taxonomy_id(Taxonomy::Category, slug)
                            .await?
                            .to_string(),
                    ),
                };
                let tag = match filter.tag.as_deref() {
                    None => None,
                    Some(tag) => match CategoryRef::from(tag) {
                        CategoryRef::Id(id) => Some(id.to_string()),
                        CategoryRef::Slug(slug) => Some(
                            self.resolve_taxonomy_id(Taxonomy::Tag, &slug)
                                .await?
                                .to_string(),
                        ),
                    },
                };
                (category, tag)
            }
        };

        Some(ListQuery {
            per_page: filter.effective_per_page(),
            page: filter.effective_page(),
            category,
            tag,
            search: filter.search.clone(),
            exclude: filter.exclude,
        })
    }
}

/// Slugs compare equal when their percent-decoded forms are.
fn same_slug(a: &str, b: &str) -> bool {
    fn decoded(s: &str) -> Cow<'_, str> {
        urlencoding::decode(s).unwrap_or(Cow::Borrowed(s))
    }
    a == b || decoded(a) == decoded(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_comparison_decodes() {
        assert!(same_slug("hello-world", "hello-world"));
        assert!(same_slug("caf%c3%a9", "café"));
        assert!(!same_slug("hello-world", "hello-world-2"));
    }
}
