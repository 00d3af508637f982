//! # gm-ui
//!
//! Askama templates for every page GameMe serves.

pub mod views;

use askama::Template;

pub use views::{CommentRow, NoticeView, PostCard, PostDetail, UploadView};

#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedTemplate<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub notices: Vec<NoticeView>,
    pub mode: &'a str,
    pub cards: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub notices: Vec<NoticeView>,
    pub post: PostDetail,
    pub comments: Vec<CommentRow>,
    /// Last author name used, kept so it need not be retyped
    pub comment_author: &'a str,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub notices: Vec<NoticeView>,
}

#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub notices: Vec<NoticeView>,
    pub prompt: &'a str,
    pub post_id: &'a str,
    pub post_title: &'a str,
    /// "feed" or "page": which delete policy applies
    pub origin: &'a str,
}

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub notices: Vec<NoticeView>,
    pub error: Option<String>,
    pub view: UploadView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::models::{FrameVariant, Post};
    use gm_core::notice::Notice;
    use gm_core::upload::UploadForm;

    fn post() -> Post {
        Post {
            id: "42".into(),
            title: "<b>Speedrun</b>".into(),
            game: Some("Celeste".into()),
            username: "madeline".into(),
            location: None,
            platform: Some("PC".into()),
            frame_variant: Some(FrameVariant::Neon),
            media_url: "https://cdn.example/celeste.png".into(),
            created_at: chrono::Utc::now(),
            like_count: 7,
        }
    }

    #[test]
    fn feed_escapes_titles_and_shows_like_count() {
        let html = FeedTemplate {
            title: "GameMe",
            active: "home",
            notices: views::notices(vec![Notice::error("Could not upvote. Reverting.")]),
            mode: "top",
            cards: vec![PostCard::from(&post())],
        }
        .render()
        .unwrap();

        assert!(html.contains("&lt;b&gt;Speedrun&lt;/b&gt;"));
        assert!(html.contains("/posts/42/like"));
        assert!(html.contains("Could not upvote. Reverting."));
        assert!(html.contains(">7<"));
    }

    #[test]
    fn empty_thread_invites_first_comment() {
        let html = PostTemplate {
            title: "Speedrun",
            active: "",
            notices: Vec::new(),
            post: PostDetail::from(&post()),
            comments: Vec::new(),
            comment_author: "",
        }
        .render()
        .unwrap();

        assert!(html.contains("No comments yet. Be the first to react!"));
        assert!(html.contains("@madeline"));
    }

    #[test]
    fn not_found_links_back_to_feed() {
        let html = NotFoundTemplate { title: "Not found", active: "", notices: Vec::new() }
            .render()
            .unwrap();
        assert!(html.contains("Post not found."));
        assert!(html.contains("href=\"/\""));
    }

    #[test]
    fn upload_form_shows_validation_error() {
        let html = UploadTemplate {
            title: "Upload Screenshot",
            active: "upload",
            notices: Vec::new(),
            error: Some("Please add a title.".into()),
            view: UploadView::new(UploadForm::default(), &[], false),
        }
        .render()
        .unwrap();

        assert!(html.contains("Please add a title."));
        assert!(html.contains("Your screenshot / GIF will appear here."));
    }
}
