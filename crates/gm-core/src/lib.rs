//! gameme/crates/gm-core/src/lib.rs
//!
//! The central domain logic and interface definitions for GameMe.

pub mod models;
pub mod traits;
pub mod error;
pub mod notice;
pub mod feed;
pub mod coordinator;
pub mod upload;
pub mod comments;
pub mod post_page;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use feed::{derive_view, FeedMode, FEED_LIMIT};
pub use coordinator::{MutationCoordinator, MutationOutcome};
pub use post_page::{PageDelete, PostPage, PostView};
pub use upload::{MediaKind, UploadForm};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Post, PostId};
    use chrono::{TimeZone, Utc};

    /// Builds a post whose creation time is `created` seconds after the epoch.
    pub fn post(id: &str, created: i64, likes: u32) -> Post {
        Post {
            id: PostId::from(id),
            title: format!("post {id}"),
            game: None,
            username: "tester".into(),
            location: None,
            platform: Some("PC".into()),
            frame_variant: None,
            media_url: format!("https://cdn.example/{id}.png"),
            created_at: Utc.timestamp_opt(created, 0).unwrap(),
            like_count: likes,
        }
    }
}
