use tracing::{debug, warn};
use wpgate_core::Category;
use wpgate_core::category::{Section, normalize_slug, section_by_slug};

use crate::error::TransportResult;
use crate::gateway::Gateway;
use crate::upstream::Taxonomy;

const LOG_TARGET: &str = "wpgate::category";

impl Gateway {
    /// Every category the upstream lists; empty on failure.
    pub async fn get_categories(&self) -> Vec<Category> {
        self.fetch_categories().await.unwrap_or_else(|err| {
            warn!(target: LOG_TARGET, err = %err, "Failed to fetch categories");
            vec![]
        })
    }

    async fn fetch_categories(&self) -> TransportResult<Vec<Category>> {
        let url = self.upstream.categories_url()?;
        let resp = self.transport.get(&url).await?.ensure_success(&url)?;
        Ok(self.upstream.parse_categories(&resp))
    }

    /// Category by slug, ignoring case.
    ///
    /// The upstream listing wins; the built-in sections fill in for
    /// categories it lacks or when it can't be reached.
    pub async fn get_category_by_slug(&self, slug: &str) -> Option<Category> {
        let wanted = normalize_slug(slug);
        if wanted.is_empty() {
            return None;
        }

        if let Some(category) = self
            .get_categories()
            .await
            .into_iter()
            .find(|category| category.slug.eq_ignore_ascii_case(&wanted))
        {
            return Some(category);
        }

        debug!(target: LOG_TARGET, slug = %wanted, "Category not listed upstream, using built-in sections");
        section_by_slug(&wanted).map(Section::to_category)
    }

    /// Upstream id of the category or tag with `slug`.
    pub(crate) async fn resolve_taxonomy_id(&self, taxonomy: Taxonomy, slug: &str) -> Option<u64> {
        let lookup = async {
            let url = self.upstream.taxonomy_lookup_url(taxonomy, slug)?;
            let resp = self.transport.get(&url).await?.ensure_success(&url)?;
            TransportResult::Ok(self.upstream.parse_taxonomy_id(&resp))
        };

        match lookup.await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                debug!(target: LOG_TARGET, ?taxonomy, slug, "No such term upstream");
                None
            }
            Err(err) => {
                warn!(target: LOG_TARGET, err = %err, ?taxonomy, slug, "Failed to look up term");
                None
            }
        }
    }
}
