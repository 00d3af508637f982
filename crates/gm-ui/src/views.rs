//! Display-ready view models. Templates only print fields; every label,
//! fallback and case change happens here.

use chrono::{DateTime, Utc};
use gm_core::models::{Comment, FrameVariant, MediaCandidate, Post, DEFAULT_PLATFORM, PLATFORMS};
use gm_core::notice::Notice;
use gm_core::upload::UploadForm;
use rand::seq::IndexedRandom;

/// "NOV 2025"
pub fn card_date(at: &DateTime<Utc>) -> String {
    at.format("%b %Y").to_string().to_uppercase()
}

/// "Nov 5, 2025, 3:04 PM"
pub fn post_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// "11/5/25, 3:04 PM"
pub fn comment_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%y, %-I:%M %p").to_string()
}

/// Frame for a feed card: the stored style, or a random one per render.
pub fn card_frame(post: &Post) -> FrameVariant {
    post.frame_variant
        .or_else(|| FrameVariant::ALL.choose(&mut rand::rng()).copied())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct NoticeView {
    pub level: &'static str,
    pub message: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            level: notice.level.as_str(),
            message: notice.message,
        }
    }
}

pub fn notices(raw: Vec<Notice>) -> Vec<NoticeView> {
    raw.into_iter().map(NoticeView::from).collect()
}

/// One tile of the home feed.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub game: Option<String>,
    pub username: String,
    pub platform: Option<String>,
    pub location: Option<String>,
    pub likes: u32,
    pub frame: &'static str,
    pub media_url: String,
    pub date_label: String,
}

impl PostCard {
    pub fn new(post: &Post, frame: FrameVariant) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            game: post.game.clone().filter(|g| !g.is_empty()),
            username: post.username.clone(),
            platform: post.platform.as_deref().filter(|p| !p.is_empty()).map(str::to_uppercase),
            location: post.location.as_deref().filter(|l| !l.is_empty()).map(str::to_uppercase),
            likes: post.like_count,
            frame: frame.as_str(),
            media_url: post.media_url.clone(),
            date_label: card_date(&post.created_at),
        }
    }
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        PostCard::new(post, card_frame(post))
    }
}

/// The single-post page header.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub game: Option<String>,
    pub username: String,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub likes: u32,
    pub frame: &'static str,
    pub media_url: String,
    pub created_label: String,
}

impl From<&Post> for PostDetail {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            game: post.game.clone().filter(|g| !g.is_empty()),
            username: post.username.clone(),
            location: post.location.clone().filter(|l| !l.is_empty()),
            platform: post.platform.clone().filter(|p| !p.is_empty()),
            likes: post.like_count,
            frame: post.frame_variant.unwrap_or_default().as_str(),
            media_url: post.media_url.clone(),
            created_label: post_date(&post.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub author: String,
    pub body: String,
    pub date_label: String,
}

impl From<&Comment> for CommentRow {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment.display_author().to_string(),
            body: comment.body.clone(),
            date_label: comment_date(&comment.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Upload form state plus everything needed to redraw it.
#[derive(Debug, Clone)]
pub struct UploadView {
    pub form: UploadForm,
    pub is_gif: bool,
    pub platforms: Vec<SelectOption>,
    pub frames: Vec<SelectOption>,
    pub preview_url: Option<String>,
    pub gif_results: Vec<GifTile>,
    pub gif_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct GifTile {
    pub url: String,
    pub preview_url: String,
    pub title: String,
    pub active: bool,
}

impl UploadView {
    pub fn new(form: UploadForm, results: &[MediaCandidate], gif_enabled: bool) -> Self {
        let platform = if form.platform.trim().is_empty() {
            DEFAULT_PLATFORM
        } else {
            form.platform.trim()
        };
        let platforms = PLATFORMS
            .iter()
            .map(|p| SelectOption {
                value: p.to_string(),
                label: p.to_string(),
                selected: *p == platform,
            })
            .collect();

        let frame = form.frame_variant.parse::<FrameVariant>().unwrap_or_default();
        let frames = FrameVariant::ALL
            .iter()
            .map(|f| SelectOption {
                value: f.as_str().to_string(),
                label: f.label().to_string(),
                selected: *f == frame,
            })
            .collect();

        let gif_results = results
            .iter()
            .map(|c| GifTile {
                url: c.url.clone(),
                preview_url: c.preview_url.clone(),
                title: c.title.clone(),
                active: c.url == form.gif_url,
            })
            .collect();

        let preview = form.media_url();
        let preview_url = (!preview.is_empty()).then(|| preview.to_string());

        Self {
            is_gif: form.media_type == gm_core::upload::MediaKind::Gif,
            form,
            platforms,
            frames,
            preview_url,
            gif_results,
            gif_enabled,
        }
    }
}
