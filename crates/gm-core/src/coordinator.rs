//! # Mutation Coordinator
//!
//! Owns the in-memory post collection behind the feed and applies user
//! mutations optimistically: the local change is visible immediately, the
//! remote write follows, and a failed write is rolled back.
//!
//! Each mutation moves `idle -> applied -> confirmed | reverted`, driven by
//! a single remote attempt. There is no retry and no request ordering, so
//! two overlapping likes on the same post can resolve out of order and the
//! later-resolving write wins remotely.
//!
//! # Developer Note
//! The collection lock is only ever held for synchronous reads and writes,
//! never across an `.await`, which is what lets other requests observe the
//! optimistic value while the store call is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::feed::{derive_view, FeedMode};
use crate::models::{Post, PostId, PostPatch};
use crate::notice::Notice;
use crate::traits::{Confirmation, ContentStore, Notifier, DELETE_PROMPT};

pub const LIKE_FAILED: &str = "Could not upvote. Reverting.";
pub const DELETE_FAILED: &str = "Could not delete post. Restoring it.";

/// Terminal state of one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The store accepted the write; the optimistic value stands.
    Confirmed,
    /// The store rejected the write; local state was rolled back.
    Reverted,
    /// The post is not in the local collection; nothing happened.
    Skipped,
    /// The user declined the confirmation prompt; nothing happened.
    Declined,
}

pub struct MutationCoordinator {
    store: Arc<dyn ContentStore>,
    notifier: Arc<dyn Notifier>,
    posts: Mutex<Vec<Post>>,
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_posts(store, notifier, Vec::new())
    }

    pub fn with_posts(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>, posts: Vec<Post>) -> Self {
        Self {
            store,
            notifier,
            posts: Mutex::new(posts),
        }
    }

    fn posts_mut(&self) -> MutexGuard<'_, Vec<Post>> {
        self.posts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the collection with the store's current posts.
    ///
    /// A failed fetch is logged and leaves an empty feed; it is not fatal.
    pub async fn load(&self) -> usize {
        match self.store.fetch_posts().await {
            Ok(posts) => {
                info!("Loaded {} posts from the store", posts.len());
                let count = posts.len();
                *self.posts_mut() = posts;
                count
            }
            Err(err) => {
                warn!("Error loading posts: {err:#}");
                self.posts_mut().clear();
                0
            }
        }
    }

    /// Copy of the full collection, in stored order.
    pub fn posts(&self) -> Vec<Post> {
        self.posts_mut().clone()
    }

    pub fn post(&self, id: &PostId) -> Option<Post> {
        self.posts_mut().iter().find(|p| &p.id == id).cloned()
    }

    pub fn like_count(&self, id: &PostId) -> Option<u32> {
        self.posts_mut().iter().find(|p| &p.id == id).map(|p| p.like_count)
    }

    pub fn len(&self) -> usize {
        self.posts_mut().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts_mut().is_empty()
    }

    /// The feed as currently displayed for `mode`.
    pub fn view(&self, mode: FeedMode) -> Vec<Post> {
        derive_view(&self.posts_mut(), mode)
    }

    /// Puts a freshly created post at the front of the collection.
    pub fn prepend(&self, post: Post) {
        self.posts_mut().insert(0, post);
    }

    /// Overwrites the local copy of a post confirmed elsewhere (e.g. the post page).
    pub fn sync(&self, post: Post) {
        if let Some(slot) = self.posts_mut().iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }

    /// Drops a post deleted elsewhere. Returns whether it was present.
    pub fn evict(&self, id: &PostId) -> bool {
        let mut posts = self.posts_mut();
        let before = posts.len();
        posts.retain(|p| &p.id != id);
        posts.len() != before
    }

    /// Adds one like to `id`, optimistically.
    ///
    /// The base count is read from local state at call time. On failure only
    /// this post's count is put back, and a notice is raised.
    pub async fn increment_like(&self, id: &PostId) -> MutationOutcome {
        let (current, next) = {
            let mut posts = self.posts_mut();
            let Some(post) = posts.iter_mut().find(|p| &p.id == id) else {
                debug!("Like ignored, post {id} is not in the feed");
                return MutationOutcome::Skipped;
            };
            let current = post.like_count;
            let next = current.saturating_add(1);
            post.like_count = next;
            (current, next)
        };
        debug!("Post {id} likes {current} -> {next} (pending)");

        match self.store.update_post(id, PostPatch::like_count(next)).await {
            Ok(()) => MutationOutcome::Confirmed,
            Err(err) => {
                warn!("Error updating upvotes for post {id}: {err:#}");
                if let Some(post) = self.posts_mut().iter_mut().find(|p| &p.id == id) {
                    post.like_count = current;
                }
                self.notifier.notify(Notice::error(LIKE_FAILED));
                MutationOutcome::Reverted
            }
        }
    }

    /// Deletes `id` after confirmation, optimistically.
    ///
    /// The whole collection is snapshotted first and restored wholesale on
    /// failure, so any local edit made while the delete was pending is lost.
    pub async fn delete<C>(&self, id: &PostId, confirmation: &C) -> MutationOutcome
    where
        C: Confirmation + ?Sized,
    {
        if !confirmation.confirm(DELETE_PROMPT) {
            debug!("Delete of post {id} declined");
            return MutationOutcome::Declined;
        }

        let snapshot = {
            let mut posts = self.posts_mut();
            if !posts.iter().any(|p| &p.id == id) {
                debug!("Delete ignored, post {id} is not in the feed");
                return MutationOutcome::Skipped;
            }
            let snapshot = posts.clone();
            posts.retain(|p| &p.id != id);
            snapshot
        };

        match self.store.delete_post(id).await {
            Ok(()) => {
                info!("Deleted post {id}");
                MutationOutcome::Confirmed
            }
            Err(err) => {
                warn!("Error deleting post {id}: {err:#}");
                *self.posts_mut() = snapshot;
                self.notifier.notify(Notice::error(DELETE_FAILED));
                MutationOutcome::Reverted
            }
        }
    }
}
