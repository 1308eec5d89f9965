mod cli;

use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::{GlobalOpts, Opts, OptsCmd, PageOpts};
use serde_json::{Value, json};
use snafu::{OptionExt as _, ResultExt as _, Snafu};
use time::OffsetDateTime;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wpgate_client::error::{CommentError, InitError, PostLookupError};
use wpgate_client::{CategoryRef, Gateway, PostFilter, ReqwestTransport, Scoped};
use wpgate_core::fmt::{format_time_ago, truncate_title};
use wpgate_core::{CommentDraft, DraftError, Post, PostRef};
use wpgate_store::{KvStore, MemoryStore, RedbStore, StoreError};

pub const LOG_TARGET: &str = "wpgate::cli";

const DB_FILE_NAME: &str = "wpgate.redb";
const BRIEF_TITLE_CHARS: usize = 80;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Failed to initialize logging"))]
    Logging,
    #[snafu(display("Initialization error: {source}"))]
    Init { source: InitError },
    #[snafu(display("Unable to determine a data dir, pass --data-dir"))]
    NoDataDir,
    #[snafu(display("Data dir error: {source}"))]
    DataDir { source: io::Error },
    #[snafu(display("Store error: {source}"))]
    Store { source: StoreError },
    #[snafu(transparent)]
    Lookup { source: PostLookupError },
    #[snafu(display("Invalid comment: {source}"))]
    InvalidComment { source: DraftError },
    #[snafu(transparent)]
    Comment { source: CommentError },
    #[snafu(display("Failed to encode output: {source}"))]
    Json { source: serde_json::Error },
    #[snafu(display("Interrupted"))]
    Interrupted,
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[snafu::report]
#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging()?;

    let opts = Opts::parse();

    let scope = Scoped::new();
    let interrupt = scope.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(target: LOG_TARGET, "Interrupted, abandoning request");
            interrupt.cancel();
        }
    });

    let value = scope.run(handle_cmd(opts)).await.context(InterruptedSnafu)??;
    println!("{}", serde_json::to_string_pretty(&value).context(JsonSnafu)?);
    Ok(())
}

async fn make_store(global: &GlobalOpts, persistent: bool) -> CliResult<Arc<dyn KvStore>> {
    if global.memory_store || !persistent {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let data_dir = global.data_dir().context(NoDataDirSnafu)?;
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context(DataDirSnafu)?;
    let path = data_dir.join(DB_FILE_NAME);
    debug!(target: LOG_TARGET, path = %path.display(), "Opening local store");

    Ok(Arc::new(RedbStore::open(path).await.context(StoreSnafu)?))
}

async fn make_gateway(global: &GlobalOpts, cmd: &OptsCmd) -> CliResult<Gateway> {
    let transport =
        ReqwestTransport::new(&global.user_agent, global.timeout()).context(InitSnafu)?;
    let store = make_store(global, cmd.needs_store()).await?;

    Gateway::builder()
        .base_url(global.api_url.as_str())
        .maybe_flavor(global.flavor.to_flavor())
        .transport(Arc::new(transport))
        .store(store)
        .build()
        .context(InitSnafu)
}

fn page_filter(page: &PageOpts) -> PostFilter {
    PostFilter::new().page(page.page).per_page(page.per_page)
}

/// Posts as JSON, either whole or in the short form used by listings.
fn posts_value(posts: &[Post], brief: bool) -> CliResult<Value> {
    if !brief {
        return serde_json::to_value(posts).context(JsonSnafu);
    }
    let now = OffsetDateTime::now_utc();
    Ok(posts
        .iter()
        .map(|post| {
            json!({
                "id": post.id,
                "slug": post.slug,
                "title": truncate_title(&post.title.rendered, BRIEF_TITLE_CHARS),
                "age": format_time_ago(&post.post_date, now),
            })
        })
        .collect())
}

async fn handle_cmd(opts: Opts) -> CliResult<Value> {
    let gateway = make_gateway(&opts.global, &opts.cmd).await?;

    Ok(match opts.cmd {
        OptsCmd::Posts {
            tag,
            category,
            exclude,
            page,
        } => {
            let mut filter = page_filter(&page);
            filter.tag = tag;
            filter.category = category.as_deref().map(CategoryRef::from);
            filter.exclude = exclude;

            posts_value(&gateway.get_posts(&filter).await, page.brief)?
        }
        OptsCmd::Post { slug } => {
            let post = gateway.get_post_by_slug(&slug).await?;
            serde_json::to_value(post).context(JsonSnafu)?
        }
        OptsCmd::CategoryPosts { category, page } => {
            let result = gateway
                .get_posts_by_category(
                    &CategoryRef::from(category.as_str()),
                    page.page,
                    page.per_page,
                )
                .await;
            json!({
                "found": result.found,
                "posts": posts_value(&result.posts, page.brief)?,
            })
        }
        OptsCmd::Category { slug } => {
            serde_json::to_value(gateway.get_category_by_slug(&slug).await).context(JsonSnafu)?
        }
        OptsCmd::Categories => {
            serde_json::to_value(gateway.get_categories().await).context(JsonSnafu)?
        }
        OptsCmd::Section { slug, limit, brief } => {
            posts_value(&gateway.get_section_posts(&slug, limit).await, brief)?
        }
        OptsCmd::CategoryPage { slug, page } => {
            match gateway
                .get_category_page(&slug, page.page, page.per_page)
                .await
            {
                Some(listing) => json!({
                    "category": listing.category,
                    "found": listing.found,
                    "has_more": listing.has_more,
                    "posts": posts_value(&listing.posts, page.brief)?,
                }),
                None => Value::Null,
            }
        }
        OptsCmd::Search { query, page } => {
            posts_value(
                &gateway.search_posts(&query, &page_filter(&page)).await,
                page.brief,
            )?
        }
        OptsCmd::Comments { post_id } => {
            let comments = gateway
                .get_comments_by_post(&PostRef::from(post_id.as_str()))
                .await;
            serde_json::to_value(comments).context(JsonSnafu)?
        }
        OptsCmd::Comment {
            post_id,
            author,
            email,
            content,
        } => {
            let draft = CommentDraft {
                post: PostRef::from(post_id.as_str()),
                author_name: author.trim().to_owned(),
                author_email: email.trim().to_owned(),
                content,
            };
            draft.validate().context(InvalidCommentSnafu)?;

            let comment = gateway.create_comment(&draft).await?;
            serde_json::to_value(comment).context(JsonSnafu)?
        }
    })
}

pub fn init_logging() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| CliError::Logging)?;

    Ok(())
}
