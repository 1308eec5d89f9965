use serde_json::Value;
use snafu::ResultExt as _;
use time::OffsetDateTime;
use tracing::{info, warn};
use wpgate_core::comment::merge_comments;
use wpgate_core::date::{format_rfc3339, unix_millis};
use wpgate_core::{
    Comment, CommentDraft, LocalComment, PostRef, RemoteComment, Rendered, UpstreamComment,
};
use wpgate_store::StoreResult;

use crate::error::{CommentResult, EncodeSnafu, PersistSnafu, SubmitError, TransportResult};
use crate::gateway::Gateway;

const LOG_TARGET: &str = "wpgate::comments";

impl Gateway {
    /// Remote and locally kept comments of a post, newest first.
    ///
    /// An unreachable upstream just means no remote comments.
    pub async fn get_comments_by_post(&self, post_id: &PostRef) -> Vec<Comment> {
        let remote = self
            .fetch_remote_comments(post_id)
            .await
            .unwrap_or_else(|err| {
                warn!(target: LOG_TARGET, err = %err, %post_id, "Failed to fetch comments");
                vec![]
            });

        let local = self
            .load_local_comments()
            .await
            .into_iter()
            .filter(|comment| comment.post_id.matches(post_id))
            .collect();

        merge_comments(remote, local)
    }

    async fn fetch_remote_comments(&self, post_id: &PostRef) -> TransportResult<Vec<RemoteComment>> {
        let url = self.upstream.comments_url(post_id)?;
        let resp = self.transport.get(&url).await?.ensure_success(&url)?;
        Ok(self.upstream.parse_comments(&resp))
    }

    /// Submit a comment, keeping it locally if the upstream won't take it.
    ///
    /// Only a failure to save the local copy is an error.
    pub async fn create_comment(&self, draft: &CommentDraft) -> CommentResult<Comment> {
        match self.submit_comment(draft).await {
            Ok(comment) => Ok(Comment::Remote(comment)),
            Err(err) => {
                info!(target: LOG_TARGET, err = %err, post = %draft.post, "Comment not accepted upstream, keeping it locally");
                let comment = LocalComment::pending(draft, OffsetDateTime::now_utc());
                self.append_local_comment(&comment).await?;
                Ok(Comment::Local(comment))
            }
        }
    }

    async fn submit_comment(&self, draft: &CommentDraft) -> Result<RemoteComment, SubmitError> {
        let (url, body) = self.upstream.create_comment_request(draft)?;
        let resp = self
            .transport
            .post_json(&url, &body)
            .await?
            .ensure_success(&url)?;

        let now = OffsetDateTime::now_utc();
        let submitted = RemoteComment {
            id: unix_millis(now),
            author_name: draft.author_name.clone(),
            date: format_rfc3339(now),
            content: Rendered::new(draft.content.trim()),
            remote: true,
        };

        Ok(
            match UpstreamComment::from_value(self.upstream.flavor(), resp.body) {
                Ok(created) => created.into_remote(submitted),
                Err(err) => {
                    warn!(target: LOG_TARGET, err = %err, "Unexpected comment response shape");
                    submitted
                }
            },
        )
    }

    /// Every comment kept in the local store, for all posts.
    ///
    /// Unreadable or malformed entries are skipped.
    pub async fn load_local_comments(&self) -> Vec<LocalComment> {
        let entries = self.read_local_entries().await.unwrap_or_else(|err| {
            warn!(target: LOG_TARGET, err = %err, "Failed to read local comments");
            vec![]
        });

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(comment) => Some(comment),
                Err(err) => {
                    warn!(target: LOG_TARGET, err = %err, "Skipping malformed local comment");
                    None
                }
            })
            .collect()
    }

    /// Raw local entries; a garbage document reads as empty.
    async fn read_local_entries(&self) -> StoreResult<Vec<Value>> {
        match self.store.read(&self.comments_key).await {
            Ok(Some(Value::Array(entries))) => Ok(entries),
            Ok(None) => Ok(vec![]),
            Ok(Some(_)) => {
                warn!(target: LOG_TARGET, key = %self.comments_key, "Local comments are not an array, ignoring");
                Ok(vec![])
            }
            Err(err) if err.is_decode() => {
                warn!(target: LOG_TARGET, err = %err, key = %self.comments_key, "Local comments unreadable, ignoring");
                Ok(vec![])
            }
            Err(err) => Err(err),
        }
    }

    async fn append_local_comment(&self, comment: &LocalComment) -> CommentResult<()> {
        let mut entries = self.read_local_entries().await.context(PersistSnafu)?;
        entries.push(serde_json::to_value(comment).context(EncodeSnafu)?);
        self.store
            .write(&self.comments_key, &Value::Array(entries))
            .await
            .context(PersistSnafu)
    }
}
