use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::Snafu;
use time::OffsetDateTime;

use crate::date;
use crate::post::Rendered;

/// Maximum comment length, in characters.
pub const MAX_COMMENT_CHARS: usize = 100;

/// Post identifier as found in comment records.
///
/// Upstreams and older local records disagree on whether ids are numbers or
/// strings, so both are accepted and compared by value and by string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostRef {
    Id(u64),
    Text(String),
}

impl PostRef {
    pub fn matches(&self, other: &PostRef) -> bool {
        self == other || self.to_string() == other.to_string()
    }

    pub fn is_blank(&self) -> bool {
        match self {
            PostRef::Id(_) => false,
            PostRef::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostRef::Id(id) => id.fmt(f),
            PostRef::Text(text) => f.write_str(text),
        }
    }
}

impl From<u64> for PostRef {
    fn from(id: u64) -> Self {
        PostRef::Id(id)
    }
}

impl From<&str> for PostRef {
    fn from(s: &str) -> Self {
        match s.trim().parse::<u64>() {
            Ok(id) => PostRef::Id(id),
            Err(_) => PostRef::Text(s.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
}

/// Comment served by the upstream replies endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub id: u64,
    pub author_name: String,
    pub date: String,
    pub content: Rendered,
    pub remote: bool,
}

/// Comment kept only in the local store after remote submission failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalComment {
    pub id: u64,
    pub author_name: String,
    pub date: String,
    pub content: String,
    pub status: CommentStatus,
    pub local_only: bool,
    pub post_id: PostRef,
}

impl LocalComment {
    pub fn pending(draft: &CommentDraft, now: OffsetDateTime) -> Self {
        Self {
            id: date::unix_millis(now),
            author_name: draft.author_name.clone(),
            date: date::format_rfc3339(now),
            content: draft.content.trim().to_owned(),
            status: CommentStatus::Pending,
            local_only: true,
            post_id: draft.post.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Comment {
    Remote(RemoteComment),
    Local(LocalComment),
}

impl Comment {
    pub fn id(&self) -> u64 {
        match self {
            Comment::Remote(c) => c.id,
            Comment::Local(c) => c.id,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Comment::Remote(c) => &c.date,
            Comment::Local(c) => &c.date,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Comment::Local(_))
    }
}

/// Union of remote and local comments, newest first.
///
/// Comments with unparseable dates sort after everything else.
pub fn merge_comments(remote: Vec<RemoteComment>, local: Vec<LocalComment>) -> Vec<Comment> {
    let mut all: Vec<Comment> = remote
        .into_iter()
        .map(Comment::Remote)
        .chain(local.into_iter().map(Comment::Local))
        .collect();
    all.sort_by_key(|comment| Reverse(date::parse_wp_date(comment.date())));
    all
}

/// Comment as entered by a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub post: PostRef,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum DraftError {
    #[snafu(display("Name is required"))]
    MissingAuthor,
    #[snafu(display("A valid email address is required"))]
    InvalidEmail,
    #[snafu(display("Comment can't be empty"))]
    EmptyContent,
    #[snafu(display("Comment is {len} characters long, the limit is {max}"))]
    ContentTooLong { len: usize, max: usize },
}

impl CommentDraft {
    /// Checks done by the form before a draft is handed to the gateway.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.author_name.trim().is_empty() {
            return Err(DraftError::MissingAuthor);
        }
        if !is_plausible_email(self.author_email.trim()) {
            return Err(DraftError::InvalidEmail);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        let len = content.chars().count();
        if MAX_COMMENT_CHARS < len {
            return Err(DraftError::ContentTooLong {
                len,
                max: MAX_COMMENT_CHARS,
            });
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
