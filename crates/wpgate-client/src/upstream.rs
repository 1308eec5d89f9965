//! Endpoint layout and response shapes of the two upstream flavors.
//!
//! This is the only place that knows how the gateway's vocabulary
//! (`per_page`, `category`, `tag`, ...) maps onto each API's query
//! parameters and where each API puts its results.

use serde_json::{Value, json};
use snafu::ResultExt as _;
use tracing::warn;
use url::Url;
use wpgate_core::{
    Category, CommentDraft, Flavor, Post, PostPage, PostRef, RemoteComment, Rendered,
    UpstreamComment, UpstreamPost,
};

use crate::error::{
    InitResult, InvalidBaseUrlSnafu, MissingPostSnafu, MissingSiteSnafu, SubmitError,
    TransportResult, UrlSnafu,
};
use crate::transport::UpstreamResponse;

const LOG_TARGET: &str = "wpgate::upstream";

/// Fields requested from WordPress.com so listings carry images and content.
pub const DOT_COM_FIELDS: &str =
    "ID,date,title,content,excerpt,slug,featured_image,attachments,categories,tags,author";

/// Page size used to pull a self-hosted site's whole category list.
pub const SELF_HOSTED_CATEGORY_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    fn path(self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Tag => "tags",
        }
    }
}

/// Listing query with taxonomy terms already in the upstream's vocabulary
/// (ids for self-hosted, ids or slugs for WordPress.com).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub per_page: u32,
    pub page: u32,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub exclude: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Upstream {
    flavor: Flavor,
    base: Url,
}

impl Upstream {
    /// `flavor` defaults to the one detected from `base_url`.
    pub fn new(base_url: &str, flavor: Option<Flavor>) -> InitResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).context(InvalidBaseUrlSnafu { url: base_url })?;
        let flavor = flavor.unwrap_or_else(|| Flavor::detect(&format!("{trimmed}/")));

        Ok(Self { flavor, base })
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn base_str(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> TransportResult<Url> {
        Url::parse(&format!("{}/{path}", self.base_str())).context(UrlSnafu)
    }

    /// Site name or domain, for WordPress.com bases (`.../sites/<site>`).
    pub fn site(&self) -> Option<&str> {
        let mut segments = self.base.path_segments()?;
        segments.find(|segment| *segment == "sites")?;
        segments.next().filter(|site| !site.is_empty())
    }

    pub fn list_posts_url(&self, query: &ListQuery) -> TransportResult<Url> {
        let mut url = self.endpoint("posts")?;
        {
            let mut pairs = url.query_pairs_mut();
            match self.flavor {
                Flavor::DotCom => {
                    pairs.append_pair("number", &query.per_page.to_string());
                    pairs.append_pair("page", &query.page.to_string());
                    pairs.append_pair("fields", DOT_COM_FIELDS);
                    if let Some(category) = &query.category {
                        pairs.append_pair("category", category);
                    }
                    if let Some(tag) = &query.tag {
                        pairs.append_pair("tag", tag);
                    }
                }
                Flavor::SelfHosted => {
                    pairs.append_pair("per_page", &query.per_page.to_string());
                    pairs.append_pair("page", &query.page.to_string());
                    pairs.append_pair("_embed", "1");
                    if let Some(category) = &query.category {
                        pairs.append_pair("categories", category);
                    }
                    if let Some(tag) = &query.tag {
                        pairs.append_pair("tags", tag);
                    }
                }
            }
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            if let Some(exclude) = query.exclude {
                pairs.append_pair("exclude", &exclude.to_string());
            }
        }
        Ok(url)
    }

    pub fn post_by_slug_url(&self, slug: &str) -> TransportResult<Url> {
        match self.flavor {
            Flavor::DotCom => self.endpoint(&format!("posts/slug:{}", urlencoding::encode(slug))),
            Flavor::SelfHosted => {
                let mut url = self.endpoint("posts")?;
                url.query_pairs_mut()
                    .append_pair("slug", slug)
                    .append_pair("_embed", "1");
                Ok(url)
            }
        }
    }

    pub fn categories_url(&self) -> TransportResult<Url> {
        let mut url = self.endpoint("categories")?;
        if self.flavor == Flavor::SelfHosted {
            url.query_pairs_mut()
                .append_pair("per_page", &SELF_HOSTED_CATEGORY_PAGE.to_string());
        }
        Ok(url)
    }

    /// Term lookup by slug; only self-hosted sites need this, since their
    /// listing filters take ids.
    pub fn taxonomy_lookup_url(&self, taxonomy: Taxonomy, slug: &str) -> TransportResult<Url> {
        let mut url = self.endpoint(taxonomy.path())?;
        url.query_pairs_mut().append_pair("slug", slug);
        Ok(url)
    }

    pub fn comments_url(&self, post_id: &PostRef) -> TransportResult<Url> {
        let post_id = post_id.to_string();
        match self.flavor {
            Flavor::DotCom => {
                self.endpoint(&format!("posts/{}/replies", urlencoding::encode(&post_id)))
            }
            Flavor::SelfHosted => {
                let mut url = self.endpoint("comments")?;
                url.query_pairs_mut().append_pair("post", &post_id);
                Ok(url)
            }
        }
    }

    /// URL and payload for submitting `draft`.
    pub fn create_comment_request(
        &self,
        draft: &CommentDraft,
    ) -> Result<(Url, Value), SubmitError> {
        if draft.post.is_blank() {
            return MissingPostSnafu.fail();
        }
        let content = draft.content.trim();

        match self.flavor {
            Flavor::DotCom => {
                if self.site().is_none() {
                    return MissingSiteSnafu.fail();
                }
                let url = self.endpoint(&format!(
                    "posts/{}/replies/new",
                    urlencoding::encode(&draft.post.to_string())
                ))?;
                let body = json!({
                    "content": content,
                    "author": draft.author_name,
                    "email": draft.author_email,
                });
                Ok((url, body))
            }
            Flavor::SelfHosted => {
                let url = self.endpoint("comments")?;
                let body = json!({
                    "post": draft.post,
                    "author_name": draft.author_name,
                    "author_email": draft.author_email,
                    "content": content,
                });
                Ok((url, body))
            }
        }
    }

    /// WordPress.com's site-independent "posts by tag" reader endpoint.
    ///
    /// `None` for self-hosted sites, or when the base URL has no `sites/`
    /// part to strip.
    pub fn reader_tag_posts_url(&self, slug: &str) -> TransportResult<Option<Url>> {
        if self.flavor != Flavor::DotCom {
            return Ok(None);
        }
        let base = self.base_str();
        let Some(idx) = base.find("sites/") else {
            return Ok(None);
        };
        let root = &base[..idx];
        let url = Url::parse(&format!(
            "{root}read/tags/{}/posts",
            urlencoding::encode(slug)
        ))
        .context(UrlSnafu)?;
        Ok(Some(url))
    }

    fn list_items<'v>(&self, body: &'v Value, dot_com_key: &str) -> &'v [Value] {
        let list = match self.flavor {
            Flavor::DotCom => body.get(dot_com_key),
            Flavor::SelfHosted => Some(body),
        };
        list.and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn normalize_post(&self, raw: Value) -> Option<Post> {
        match UpstreamPost::from_value(self.flavor, raw) {
            Ok(post) => Some(post.normalize()),
            Err(err) => {
                warn!(target: LOG_TARGET, err = %err, "Skipping malformed post");
                None
            }
        }
    }

    pub fn parse_post_page(&self, resp: UpstreamResponse) -> PostPage {
        let found = match self.flavor {
            Flavor::DotCom => resp.body.get("found").and_then(Value::as_u64),
            Flavor::SelfHosted => resp.total,
        };
        let posts = self
            .list_items(&resp.body, "posts")
            .iter()
            .filter_map(|raw| self.normalize_post(raw.clone()))
            .collect();
        PostPage::new(posts, found)
    }

    /// The single post in a by-slug response, if any.
    pub fn parse_single_post(&self, resp: UpstreamResponse) -> Option<Post> {
        let raw = match self.flavor {
            Flavor::DotCom => Some(resp.body).filter(Value::is_object),
            Flavor::SelfHosted => resp
                .body
                .as_array()
                .and_then(|posts| posts.first())
                .cloned(),
        }?;
        self.normalize_post(raw)
    }

    pub fn parse_categories(&self, resp: &UpstreamResponse) -> Vec<Category> {
        self.list_items(&resp.body, "categories")
            .iter()
            .filter_map(|raw| match serde_json::from_value(raw.clone()) {
                Ok(category) => Some(category),
                Err(err) => {
                    warn!(target: LOG_TARGET, err = %err, "Skipping malformed category");
                    None
                }
            })
            .collect()
    }

    pub fn parse_taxonomy_id(&self, resp: &UpstreamResponse) -> Option<u64> {
        resp.body
            .as_array()?
            .first()?
            .get("id")
            .and_then(Value::as_u64)
    }

    pub fn parse_comments(&self, resp: &UpstreamResponse) -> Vec<RemoteComment> {
        self.list_items(&resp.body, "comments")
            .iter()
            .filter_map(
                |raw| match UpstreamComment::from_value(self.flavor, raw.clone()) {
                    Ok(comment) => Some(comment.into_remote(blank_remote_comment())),
                    Err(err) => {
                        warn!(target: LOG_TARGET, err = %err, "Skipping malformed comment");
                        None
                    }
                },
            )
            .collect()
    }
}

fn blank_remote_comment() -> RemoteComment {
    RemoteComment {
        id: 0,
        author_name: String::new(),
        date: String::new(),
        content: Rendered::default(),
        remote: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT_COM: &str = "https://public-api.wordpress.com/rest/v1.1/sites/news.example/";
    const SELF_HOSTED: &str = "https://news.example/wp-json/wp/v2";

    fn dot_com() -> Upstream {
        Upstream::new(DOT_COM, None).unwrap()
    }

    fn self_hosted() -> Upstream {
        Upstream::new(SELF_HOSTED, None).unwrap()
    }

    fn query() -> ListQuery {
        ListQuery {
            per_page: 10,
            page: 2,
            category: Some("31554".into()),
            tag: Some("tech".into()),
            search: Some("rust & go".into()),
            exclude: Some(7),
        }
    }

    #[test]
    fn dot_com_listing_vocabulary() {
        let url = dot_com().list_posts_url(&query()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://public-api.wordpress.com/rest/v1.1/sites/news.example/posts\
             ?number=10&page=2\
             &fields=ID%2Cdate%2Ctitle%2Ccontent%2Cexcerpt%2Cslug%2Cfeatured_image%2Cattachments%2Ccategories%2Ctags%2Cauthor\
             &category=31554&tag=tech&search=rust+%26+go&exclude=7"
        );
    }

    #[test]
    fn self_hosted_listing_vocabulary() {
        let url = self_hosted().list_posts_url(&query()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://news.example/wp-json/wp/v2/posts\
             ?per_page=10&page=2&_embed=1&categories=31554&tags=tech&search=rust+%26+go&exclude=7"
        );
    }

    #[test]
    fn slug_is_encoded() {
        assert_eq!(
            dot_com().post_by_slug_url("a b/c").unwrap().as_str(),
            "https://public-api.wordpress.com/rest/v1.1/sites/news.example/posts/slug:a%20b%2Fc"
        );
        assert_eq!(
            self_hosted().post_by_slug_url("a b/c").unwrap().as_str(),
            "https://news.example/wp-json/wp/v2/posts?slug=a+b%2Fc&_embed=1"
        );
    }

    #[test]
    fn site_and_reader_endpoint() {
        assert_eq!(dot_com().site(), Some("news.example"));
        assert_eq!(self_hosted().site(), None);
        assert_eq!(
            dot_com()
                .reader_tag_posts_url("tech")
                .unwrap()
                .map(|u| u.to_string()),
            Some("https://public-api.wordpress.com/rest/v1.1/read/tags/tech/posts".to_owned())
        );
        assert_eq!(self_hosted().reader_tag_posts_url("tech").unwrap(), None);
    }

    #[test]
    fn comment_endpoints() {
        let draft = CommentDraft {
            post: PostRef::Id(5),
            author_name: "Asha".into(),
            author_email: "asha@example.com".into(),
            content: " hi ".into(),
        };

        let (url, body) = dot_com().create_comment_request(&draft).unwrap();
        assert!(url.as_str().ends_with("/sites/news.example/posts/5/replies/new"));
        assert_eq!(
            body,
            json!({"content": "hi", "author": "Asha", "email": "asha@example.com"})
        );

        let (url, body) = self_hosted().create_comment_request(&draft).unwrap();
        assert_eq!(url.as_str(), "https://news.example/wp-json/wp/v2/comments");
        assert_eq!(body["post"], 5);
        assert_eq!(body["author_email"], "asha@example.com");

        let blank = CommentDraft {
            post: PostRef::Text(" ".into()),
            ..draft
        };
        assert!(matches!(
            dot_com().create_comment_request(&blank),
            Err(SubmitError::MissingPost)
        ));

        let no_site = Upstream::new(
            "https://public-api.wordpress.com/rest/v1.1",
            Some(Flavor::DotCom),
        )
        .unwrap();
        assert!(matches!(
            no_site.create_comment_request(&CommentDraft {
                post: PostRef::Id(5),
                author_name: "A".into(),
                author_email: "a@b.co".into(),
                content: "x".into(),
            }),
            Err(SubmitError::MissingSite)
        ));
    }

    #[test]
    fn parses_listing_shapes() {
        let page = dot_com().parse_post_page(UpstreamResponse::ok(json!({
            "found": 25,
            "posts": [{ "ID": 1, "slug": "a" }, { "slug": "missing-id" }],
        })));
        assert_eq!(page.found, 25);
        assert_eq!(page.posts.len(), 1);

        let page = self_hosted().parse_post_page(
            UpstreamResponse::ok(json!([{ "id": 1, "slug": "a" }, { "id": 2, "slug": "b" }]))
                .with_total(40),
        );
        assert_eq!(page.found, 40);
        assert_eq!(page.posts.len(), 2);

        let page = self_hosted().parse_post_page(UpstreamResponse::ok(json!({"code": "x"})));
        assert!(page.is_empty());
        assert_eq!(page.found, 0);
    }
}
