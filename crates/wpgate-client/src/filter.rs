use std::fmt;

/// Page size used when a filter doesn't set one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// A category given either by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(u64),
    Slug(String),
}

impl CategoryRef {
    pub fn as_slug(&self) -> Option<&str> {
        match self {
            CategoryRef::Id(_) => None,
            CategoryRef::Slug(slug) => Some(slug),
        }
    }
}

impl From<&str> for CategoryRef {
    /// All-digit strings are ids, anything else is a slug.
    fn from(s: &str) -> Self {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse() {
                return CategoryRef::Id(id);
            }
        }
        CategoryRef::Slug(s.to_owned())
    }
}

impl From<u64> for CategoryRef {
    fn from(id: u64) -> Self {
        CategoryRef::Id(id)
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRef::Id(id) => id.fmt(f),
            CategoryRef::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Listing filter in the gateway's own vocabulary; translated per upstream
/// flavor by [`crate::upstream::Upstream`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub category: Option<CategoryRef>,
    pub per_page: Option<u32>,
    /// 1-based
    pub page: Option<u32>,
    pub exclude: Option<u64>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn category(mut self, category: impl Into<CategoryRef>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn exclude(mut self, post_id: u64) -> Self {
        self.exclude = Some(post_id);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn effective_per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1)
    }

    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}
