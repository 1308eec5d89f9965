use snafu::Snafu;
use wpgate_store::StoreError;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InitError {
    #[snafu(display("Invalid API base URL {url}: {source}"))]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[snafu(display("Failed to build HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },
}

pub type InitResult<T> = std::result::Result<T, InitError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("Request to {url} failed: {source}"))]
    Http { url: String, source: BoxedError },
    #[snafu(display("{url} returned status {status}"))]
    Status { url: String, status: u16 },
    #[snafu(display("Invalid JSON from {url}: {source}"))]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to build upstream URL: {source}"))]
    Url { source: url::ParseError },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PostLookupError {
    #[snafu(display("No slug given"))]
    EmptySlug,
    #[snafu(display("Post not found: {slug}"))]
    NotFound { slug: String },
    #[snafu(display("Failed to fetch post {slug}: {source}"))]
    Fetch {
        slug: String,
        source: TransportError,
    },
}

impl PostLookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PostLookupError::NotFound { .. } | PostLookupError::EmptySlug
        )
    }
}

pub type PostLookupResult<T> = std::result::Result<T, PostLookupError>;

/// Why a comment could not be submitted upstream.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SubmitError {
    #[snafu(display("API base URL names no site"))]
    MissingSite,
    #[snafu(display("Comment names no post"))]
    MissingPost,
    #[snafu(transparent)]
    Transport { source: TransportError },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommentError {
    #[snafu(display("Unable to save comment locally: {source}"))]
    Persist { source: StoreError },
    #[snafu(display("Unable to encode local comment: {source}"))]
    Encode { source: serde_json::Error },
}

pub type CommentResult<T> = std::result::Result<T, CommentError>;
