//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::models::{Comment, MediaCandidate, NewComment, NewPost, Post, PostId, PostPatch};
use crate::notice::Notice;

/// Prompt shown before a post is deleted.
pub const DELETE_PROMPT: &str = "Delete this post? This cannot be undone.";

/// Data persistence contract for posts and comments, backed by the hosted store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    // Post Operations
    /// All posts, newest first.
    async fn fetch_posts(&self) -> anyhow::Result<Vec<Post>>;
    async fn fetch_post(&self, id: &PostId) -> anyhow::Result<Option<Post>>;
    /// Inserts and returns the stored row (with generated id and timestamp).
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post>;
    /// Partial update: only the fields set on `patch` change.
    async fn update_post(&self, id: &PostId, patch: PostPatch) -> anyhow::Result<()>;
    async fn delete_post(&self, id: &PostId) -> anyhow::Result<()>;

    // Comment Operations
    /// Comments of one post, oldest first.
    async fn fetch_comments(&self, post_id: &PostId) -> anyhow::Result<Vec<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment>;
}

/// Third-party media search used by the upload flow.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaSearch: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> anyhow::Result<Vec<MediaCandidate>>;

    /// `false` when the provider cannot be queried at all (e.g. no API key).
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The user-visible notification surface.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// A blocking yes/no prompt answered by the user.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

/// An answer collected before the call (e.g. from a submitted form).
impl Confirmation for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}
