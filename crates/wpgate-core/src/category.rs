use serde::{Deserialize, Serialize};

/// A post category.
///
/// WordPress.com names the id `ID`, self-hosted sites use `id`; both parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "ID", alias = "id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A site section with a well-known category id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub id: u64,
    pub slug: &'static str,
    pub name: &'static str,
}

impl Section {
    pub fn to_category(&self) -> Category {
        Category {
            id: self.id,
            name: self.name.to_owned(),
            slug: self.slug.to_owned(),
        }
    }
}

/// Built-in sections, used when the upstream taxonomy is incomplete.
pub const SECTIONS: &[Section] = &[
    Section {
        id: 31553,
        slug: "trending",
        name: "Trending",
    },
    Section {
        id: 31554,
        slug: "tech",
        name: "Tech",
    },
    Section {
        id: 31555,
        slug: "movies",
        name: "Movies",
    },
    Section {
        id: 31556,
        slug: "business",
        name: "Business",
    },
    Section {
        id: 31557,
        slug: "crypto",
        name: "Crypto",
    },
    Section {
        id: 31558,
        slug: "career",
        name: "Career",
    },
    Section {
        id: 31559,
        slug: "finance",
        name: "Finance",
    },
    Section {
        id: 31560,
        slug: "sports",
        name: "Sports",
    },
    Section {
        id: 31561,
        slug: "health",
        name: "Health",
    },
    Section {
        id: 31562,
        slug: "politics",
        name: "Politics",
    },
    Section {
        id: 31563,
        slug: "world",
        name: "World",
    },
];

/// Slug of the section that lists the latest posts without any filter.
pub const TRENDING_SLUG: &str = "trending";

/// Case-insensitive lookup in [`SECTIONS`].
pub fn section_by_slug(slug: &str) -> Option<&'static Section> {
    let slug = slug.trim();
    SECTIONS
        .iter()
        .find(|section| section.slug.eq_ignore_ascii_case(slug))
}

pub fn section_by_id(id: u64) -> Option<&'static Section> {
    SECTIONS.iter().find(|section| section.id == id)
}

/// Slug normalization used before any lookup.
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let section = section_by_slug(" Trending ").expect("known section");
        assert_eq!(section.id, 31553);
        assert_eq!(section.name, "Trending");
        assert!(section_by_slug("gardening").is_none());
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(section_by_id(31554).map(|s| s.slug), Some("tech"));
        assert_eq!(section_by_id(1), None);
    }

    #[test]
    fn section_ids_are_unique() {
        for (i, a) in SECTIONS.iter().enumerate() {
            for b in &SECTIONS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.slug, b.slug);
            }
        }
    }

    #[test]
    fn category_parses_both_id_spellings() {
        let dot_com: Category =
            serde_json::from_str(r#"{"ID": 5, "name": "News", "slug": "news"}"#).unwrap();
        let self_hosted: Category =
            serde_json::from_str(r#"{"id": 5, "name": "News", "slug": "news"}"#).unwrap();
        assert_eq!(dot_com, self_hosted);
        assert_eq!(
            serde_json::to_value(&dot_com).unwrap(),
            serde_json::json!({"ID": 5, "name": "News", "slug": "news"})
        );
    }
}
