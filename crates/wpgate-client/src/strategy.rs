//! Ordered fallback chains behind category and section listings.
//!
//! Upstream taxonomies are rarely consistent: the same section can be a tag
//! on one site, a category on another, and only known by its id on a third.
//! Listings therefore try a list of [`Strategy`]s in order and keep the
//! first one that yields anything.

use serde::Serialize;
use tracing::{debug, warn};
use wpgate_core::category::{TRENDING_SLUG, normalize_slug, section_by_id, section_by_slug};
use wpgate_core::fmt::format_category_name;
use wpgate_core::{Category, Flavor, Post, PostPage};

use crate::error::TransportResult;
use crate::filter::{CategoryRef, PostFilter};
use crate::gateway::Gateway;

const LOG_TARGET: &str = "wpgate::strategy";

/// One way of finding a page of posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Newest posts, unfiltered
    Latest,
    Tag(String),
    Category(CategoryRef),
    /// Category slug resolved to an id through the category listing first
    ResolvedCategory(String),
    /// Site-independent "posts by tag" endpoint
    TagEndpoint(String),
}

/// A category page: the category to display plus one page of its posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub posts: Vec<Post>,
    pub found: u64,
    pub has_more: bool,
}

/// Strategies for a home page section, in the order they are tried.
///
/// Built-in section ids are WordPress.com category ids, so only that flavor
/// tries them.
pub fn section_strategies(slug: &str, flavor: Flavor) -> Vec<Strategy> {
    let slug = normalize_slug(slug);
    if slug == TRENDING_SLUG {
        return vec![Strategy::Latest];
    }

    let mut strategies = vec![
        Strategy::Tag(slug.clone()),
        Strategy::Category(CategoryRef::Slug(slug.clone())),
    ];
    if let Some(section) = section_by_slug(&slug).filter(|_| flavor == Flavor::DotCom) {
        strategies.push(Strategy::Category(CategoryRef::Id(section.id)));
    }
    strategies.push(Strategy::ResolvedCategory(slug));
    strategies
}

/// Strategies for a category listing, in the order they are tried.
pub fn category_strategies(category: &CategoryRef) -> Vec<Strategy> {
    let mut strategies = vec![Strategy::Category(category.clone())];
    if let Some(slug) = category.as_slug() {
        strategies.push(Strategy::ResolvedCategory(slug.to_owned()));
        strategies.push(Strategy::TagEndpoint(slug.to_owned()));
    }
    strategies
}

impl Gateway {
    /// Run a single strategy; failures come back as an empty page.
    pub async fn attempt(&self, strategy: &Strategy, page: u32, per_page: u32) -> PostPage {
        let filter = PostFilter::new().page(page).per_page(per_page);
        match strategy {
            Strategy::Latest => self.try_list(&filter).await,
            Strategy::Tag(tag) => self.try_list(&filter.tag(tag.as_str())).await,
            Strategy::Category(category) => self.try_list(&filter.category(category.clone())).await,
            Strategy::ResolvedCategory(slug) => match self.category_id_by_slug(slug).await {
                Some(id) => self.try_list(&filter.category(id)).await,
                None => PostPage::default(),
            },
            Strategy::TagEndpoint(slug) => {
                self.fetch_tag_endpoint(slug, &filter)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(target: LOG_TARGET, err = %err, %slug, "Failed to fetch posts by tag");
                        PostPage::default()
                    })
            }
        }
    }

    /// First non-empty result of `strategies`, tried in order.
    pub async fn run_strategies(
        &self,
        strategies: &[Strategy],
        page: u32,
        per_page: u32,
    ) -> PostPage {
        for strategy in strategies {
            let result = self.attempt(strategy, page, per_page).await;
            if !result.is_empty() {
                debug!(target: LOG_TARGET, ?strategy, count = result.posts.len(), "Strategy matched");
                return result;
            }
            debug!(target: LOG_TARGET, ?strategy, "Strategy found nothing");
        }
        PostPage::default()
    }

    /// Category id for `slug` that the upstream understands.
    ///
    /// Self-hosted sites only get ids from their own listing, never from the
    /// built-in sections.
    async fn category_id_by_slug(&self, slug: &str) -> Option<u64> {
        match self.flavor() {
            Flavor::DotCom => self.get_category_by_slug(slug).await.map(|c| c.id),
            Flavor::SelfHosted => self
                .get_categories()
                .await
                .into_iter()
                .find(|category| category.slug.eq_ignore_ascii_case(slug.trim()))
                .map(|category| category.id),
        }
    }

    /// WordPress.com's reader endpoint when available, a plain tag filter
    /// otherwise.
    async fn fetch_tag_endpoint(&self, slug: &str, filter: &PostFilter) -> TransportResult<PostPage> {
        let Some(url) = self.upstream.reader_tag_posts_url(slug)? else {
            return self.list(&filter.clone().tag(slug)).await;
        };
        let resp = self.transport.get(&url).await?.ensure_success(&url)?;
        Ok(self.upstream.parse_post_page(resp))
    }

    /// Posts of a category given by id or slug, trying the category itself,
    /// then the slug resolved to an id, then the slug as a tag.
    pub async fn get_posts_by_category(
        &self,
        category: &CategoryRef,
        page: u32,
        per_page: u32,
    ) -> PostPage {
        self.run_strategies(&category_strategies(category), page.max(1), per_page.max(1))
            .await
    }

    /// Posts for a home page section.
    ///
    /// `trending` lists the newest posts; any other slug is tried as a tag,
    /// a category slug, the built-in section id and the upstream category id.
    pub async fn get_section_posts(&self, slug: &str, limit: u32) -> Vec<Post> {
        if slug.trim().is_empty() {
            return vec![];
        }
        self.run_strategies(&section_strategies(slug, self.flavor()), 1, limit.max(1))
            .await
            .posts
    }

    /// Everything a category page shows. `None` for a blank slug.
    pub async fn get_category_page(
        &self,
        slug: &str,
        page: u32,
        per_page: u32,
    ) -> Option<CategoryListing> {
        let slug = normalize_slug(slug);
        if slug.is_empty() {
            return None;
        }
        let page = page.max(1);
        let per_page = per_page.max(1);

        let category = self.display_category(&slug).await;

        let mut result = self
            .get_posts_by_category(&CategoryRef::Slug(slug), page, per_page)
            .await;
        let upstream_id = category.id != 0
            && (self.flavor() == Flavor::DotCom || section_by_id(category.id).is_none());
        if result.is_empty() && upstream_id {
            result = self
                .get_posts_by_category(&CategoryRef::Id(category.id), page, per_page)
                .await;
        }

        let has_more = result.posts.len() == per_page as usize
            && u64::from(page) * u64::from(per_page) < result.found;

        Some(CategoryListing {
            category,
            posts: result.posts,
            found: result.found,
            has_more,
        })
    }

    /// Category to display for `slug`, made up from the slug when nobody
    /// knows it (with id 0).
    async fn display_category(&self, slug: &str) -> Category {
        if let Some(section) = section_by_slug(slug) {
            return section.to_category();
        }
        if let Some(category) = self.get_category_by_slug(slug).await {
            return category;
        }
        Category {
            id: 0,
            name: format_category_name(slug),
            slug: slug.to_owned(),
        }
    }
}
