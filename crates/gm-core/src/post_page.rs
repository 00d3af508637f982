//! # Single post page
//!
//! Backs `/post/{id}`: loads one post with its comments and runs the
//! page's own like, delete and comment actions. Unlike the feed, page
//! deletes are not optimistic, and both like and delete refuse to start
//! while the same action is already pending for that post.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::comments;
use crate::coordinator::{MutationOutcome, LIKE_FAILED};
use crate::models::{Comment, Post, PostId, PostPatch};
use crate::notice::Notice;
use crate::traits::{Confirmation, ContentStore, Notifier, DELETE_PROMPT};

pub const PAGE_DELETE_FAILED: &str = "Could not delete post.";
pub const COMMENT_FAILED: &str = "Could not add comment. Please try again.";

/// What `/post/{id}` renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PostView {
    NotFound,
    Found { post: Post, comments: Vec<Comment> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDelete {
    Deleted,
    Failed,
    Declined,
    /// Another delete of the same post is still pending.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PageAction {
    Like,
    Delete,
}

/// Set of (post, action) pairs currently awaiting the store.
#[derive(Debug, Default)]
struct InFlight {
    pending: Mutex<HashSet<(PostId, PageAction)>>,
}

impl InFlight {
    fn begin(&self, id: &PostId, action: PageAction) -> Option<InFlightGuard<'_>> {
        let key = (id.clone(), action);
        let inserted = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then_some(InFlightGuard { owner: self, key })
    }
}

struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: (PostId, PageAction),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

pub struct PostPage {
    store: Arc<dyn ContentStore>,
    notifier: Arc<dyn Notifier>,
    in_flight: InFlight,
}

impl PostPage {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            in_flight: InFlight::default(),
        }
    }

    /// Fetches the post and its comments.
    ///
    /// A missing post and a failed fetch both render as not found; a failed
    /// comment fetch renders as an empty thread.
    pub async fn load(&self, id: &PostId) -> PostView {
        let post = match self.store.fetch_post(id).await {
            Ok(Some(post)) => post,
            Ok(None) => return PostView::NotFound,
            Err(err) => {
                warn!("Error loading post {id}: {err:#}");
                return PostView::NotFound;
            }
        };

        let mut comments = self.store.fetch_comments(id).await.unwrap_or_else(|err| {
            warn!("Error loading comments for post {id}: {err:#}");
            Vec::new()
        });
        comments::sort_for_display(&mut comments);

        PostView::Found { post, comments }
    }

    /// Likes the page's copy of `post`, optimistically.
    ///
    /// Returns `Skipped` when a like of the same post is already pending.
    pub async fn like(&self, post: &mut Post) -> MutationOutcome {
        let Some(_guard) = self.in_flight.begin(&post.id, PageAction::Like) else {
            debug!("Like of post {} already pending", post.id);
            return MutationOutcome::Skipped;
        };

        let current = post.like_count;
        post.like_count = current.saturating_add(1);

        match self.store.update_post(&post.id, PostPatch::like_count(post.like_count)).await {
            Ok(()) => MutationOutcome::Confirmed,
            Err(err) => {
                warn!("Error updating upvotes for post {}: {err:#}", post.id);
                post.like_count = current;
                self.notifier.notify(Notice::error(LIKE_FAILED));
                MutationOutcome::Reverted
            }
        }
    }

    /// Deletes after confirmation. Nothing local changes until the store agrees.
    pub async fn delete<C>(&self, id: &PostId, confirmation: &C) -> PageDelete
    where
        C: Confirmation + ?Sized,
    {
        let Some(_guard) = self.in_flight.begin(id, PageAction::Delete) else {
            return PageDelete::Busy;
        };
        if !confirmation.confirm(DELETE_PROMPT) {
            return PageDelete::Declined;
        }

        match self.store.delete_post(id).await {
            Ok(()) => PageDelete::Deleted,
            Err(err) => {
                warn!("Error deleting post {id}: {err:#}");
                self.notifier.notify(Notice::error(PAGE_DELETE_FAILED));
                PageDelete::Failed
            }
        }
    }

    /// Posts a comment. A blank body is a no-op and returns `None`.
    pub async fn add_comment(&self, post_id: &PostId, author: &str, body: &str) -> Option<Comment> {
        let payload = comments::compose(post_id, author, body)?;

        match self.store.insert_comment(payload).await {
            Ok(comment) => Some(comment),
            Err(err) => {
                warn!("Error adding comment to post {post_id}: {err:#}");
                self.notifier.notify(Notice::error(COMMENT_FAILED));
                None
            }
        }
    }
}
