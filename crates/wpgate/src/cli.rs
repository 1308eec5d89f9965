use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use wpgate_client::DEFAULT_PER_PAGE;
use wpgate_client::transport::DEFAULT_USER_AGENT;
use wpgate_core::Flavor;

/// Command line front-end of the wpgate content gateway
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: OptsCmd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FlavorOpt {
    /// Detect from the API URL
    #[default]
    Auto,
    DotCom,
    SelfHosted,
}

impl FlavorOpt {
    pub fn to_flavor(self) -> Option<Flavor> {
        match self {
            FlavorOpt::Auto => None,
            FlavorOpt::DotCom => Some(Flavor::DotCom),
            FlavorOpt::SelfHosted => Some(Flavor::SelfHosted),
        }
    }
}

/// Global options that apply across all commands
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Upstream API base URL, e.g.
    /// `https://public-api.wordpress.com/rest/v1.1/sites/<site>` or
    /// `https://<site>/wp-json/wp/v2`
    #[arg(env = "WPGATE_API_URL", long)]
    pub api_url: String,

    /// Which REST API the upstream speaks
    #[arg(env = "WPGATE_FLAVOR", long, value_enum, default_value_t = FlavorOpt::Auto)]
    pub flavor: FlavorOpt,

    /// Where locally kept comments are stored
    #[arg(env = "WPGATE_DATA_DIR", long)]
    pub data_dir: Option<PathBuf>,

    /// Keep local comments in memory only
    #[arg(long)]
    pub memory_store: bool,

    /// Per-request timeout
    #[arg(env = "WPGATE_TIMEOUT_SECS", long)]
    pub timeout_secs: Option<u64>,

    #[arg(env = "WPGATE_USER_AGENT", long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

static PROJECT_DIRS: LazyLock<Option<directories::ProjectDirs>> =
    LazyLock::new(|| directories::ProjectDirs::from("org", "wpgate", "wpgate"));

impl GlobalOpts {
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            let dirs = PROJECT_DIRS.as_ref()?;
            Some(
                dirs.state_dir()
                    .unwrap_or_else(|| dirs.data_local_dir())
                    .to_owned(),
            )
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Paging options shared by listing commands
#[derive(Debug, Args)]
pub struct PageOpts {
    /// 1-based page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Print only id, slug, shortened title and age of each post
    #[arg(long)]
    pub brief: bool,
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// List posts
    Posts {
        #[arg(long)]
        tag: Option<String>,

        /// Category id or slug
        #[arg(long)]
        category: Option<String>,

        /// Post id to leave out
        #[arg(long)]
        exclude: Option<u64>,

        #[command(flatten)]
        page: PageOpts,
    },
    /// Fetch a single post by slug
    Post { slug: String },
    /// List posts of a category, falling back to the slug as a tag
    CategoryPosts {
        /// Category id or slug
        category: String,

        #[command(flatten)]
        page: PageOpts,
    },
    /// Look up a category by slug
    Category { slug: String },
    /// List all upstream categories
    Categories,
    /// Posts for a home page section
    Section {
        slug: String,

        #[arg(long, default_value = "6")]
        limit: u32,

        #[arg(long)]
        brief: bool,
    },
    /// Category page: category, posts and whether there are more
    CategoryPage {
        slug: String,

        #[command(flatten)]
        page: PageOpts,
    },
    /// Full-text search
    Search {
        query: String,

        #[command(flatten)]
        page: PageOpts,
    },
    /// Comments of a post, including locally kept ones
    Comments { post_id: String },
    /// Submit a comment; kept locally if the upstream refuses it
    Comment {
        post_id: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        content: String,
    },
}

impl OptsCmd {
    /// Whether the command touches locally kept comments.
    pub fn needs_store(&self) -> bool {
        matches!(self, OptsCmd::Comments { .. } | OptsCmd::Comment { .. })
    }
}
