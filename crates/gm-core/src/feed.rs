//! # Feed view policy
//!
//! Derives the bounded, ordered slice of posts shown on the home feed.
//! The source collection is never touched; every view is a fresh copy.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Post;

/// Maximum number of posts in a feed view.
pub const FEED_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Creation time, most recent first
    #[default]
    Newest,
    /// Like count, highest first
    Top,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Newest => "newest",
            FeedMode::Top => "top",
        }
    }

    /// Parses a query-string value; anything unrecognised falls back to `Newest`.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(FeedMode::Newest),
            "top" => Ok(FeedMode::Top),
            other => Err(format!("unknown feed mode `{other}`")),
        }
    }
}

/// Copies, sorts and truncates `posts` for display.
///
/// `sort_by_key` is stable, so posts with equal like counts in `Top` mode
/// keep the order they had in `posts`.
pub fn derive_view(posts: &[Post], mode: FeedMode) -> Vec<Post> {
    let mut view = posts.to_vec();
    match mode {
        FeedMode::Newest => view.sort_by_key(|p| Reverse(p.created_at)),
        FeedMode::Top => view.sort_by_key(|p| Reverse(p.like_count)),
    }
    view.truncate(FEED_LIMIT);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::post;

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn newest_orders_by_creation_descending() {
        let posts = vec![post("t1", 3, 0), post("t2", 1, 0), post("t3", 2, 0)];
        let view = derive_view(&posts, FeedMode::Newest);

        assert_eq!(ids(&view), ["t1", "t3", "t2"]);
        assert_eq!(ids(&posts), ["t1", "t2", "t3"]);
    }

    #[test]
    fn top_orders_by_likes_descending() {
        let posts = vec![post("a", 1, 5), post("b", 2, 9), post("c", 3, 1)];
        let view = derive_view(&posts, FeedMode::Top);

        let likes: Vec<u32> = view.iter().map(|p| p.like_count).collect();
        assert_eq!(likes, [9, 5, 1]);
        assert_eq!(ids(&posts), ["a", "b", "c"]);
    }

    #[test]
    fn top_ties_keep_prior_order() {
        let posts = vec![post("x", 1, 4), post("y", 2, 7), post("z", 3, 4)];
        let view = derive_view(&posts, FeedMode::Top);
        assert_eq!(ids(&view), ["y", "x", "z"]);
    }

    #[test]
    fn views_are_capped_at_the_feed_limit() {
        let posts: Vec<Post> = (0..25).map(|i| post(&format!("p{i}"), i, (i % 7) as u32)).collect();

        for mode in [FeedMode::Newest, FeedMode::Top] {
            let view = derive_view(&posts, mode);
            assert_eq!(view.len(), FEED_LIMIT);
        }

        let newest = derive_view(&posts, FeedMode::Newest);
        assert_eq!(newest[0].id.as_str(), "p24");
        assert_eq!(posts.len(), 25);
    }

    #[test]
    fn small_collections_are_not_padded() {
        let posts = vec![post("only", 1, 0)];
        assert_eq!(derive_view(&posts, FeedMode::Top).len(), 1);
        assert!(derive_view(&[], FeedMode::Newest).is_empty());
    }

    #[test]
    fn unknown_mode_param_falls_back_to_newest() {
        assert_eq!(FeedMode::from_param(Some("top")), FeedMode::Top);
        assert_eq!(FeedMode::from_param(Some("TOP")), FeedMode::Top);
        assert_eq!(FeedMode::from_param(Some("hot")), FeedMode::Newest);
        assert_eq!(FeedMode::from_param(None), FeedMode::Newest);
    }
}
