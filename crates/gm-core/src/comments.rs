//! Comment composition and display ordering.

use crate::models::{Comment, NewComment, PostId, ANONYMOUS};

/// Builds an insert payload from raw form input.
///
/// Returns `None` for a blank body (nothing to post). A blank author is
/// stored as [`ANONYMOUS`].
pub fn compose(post_id: &PostId, author: &str, body: &str) -> Option<NewComment> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let author = match author.trim() {
        "" => ANONYMOUS,
        name => name,
    };

    Some(NewComment {
        post_id: post_id.clone(),
        author: author.to_string(),
        body: body.to_string(),
    })
}

/// Oldest first. Stable, so equal timestamps keep store order.
pub fn sort_for_display(comments: &mut [Comment]) {
    comments.sort_by_key(|c| c.created_at);
}
