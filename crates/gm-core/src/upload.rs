//! # Upload flow
//!
//! Turns the raw upload form into an insert payload. Validation runs
//! before anything touches the store.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FrameVariant, NewPost, Post, DEFAULT_PLATFORM};
use crate::traits::ContentStore;

pub const MISSING_TITLE: &str = "Please add a title.";
pub const MISSING_USERNAME: &str = "Please add a username.";
pub const MISSING_MEDIA: &str = "Please provide an image URL or pick a GIF.";
pub const POSTED: &str = "Screenshot posted! 🎮";

/// Results shown in the upload form's GIF grid.
pub const UPLOAD_GIF_LIMIT: u32 = 12;
/// Query the GIF picker loads when it opens with nothing typed.
pub const GIF_PICKER_QUERY: &str = "gaming";
pub const GIF_PICKER_LIMIT: u32 = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Gif,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Gif => "gif",
        }
    }
}

/// Raw form state, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadForm {
    pub title: String,
    pub game: String,
    pub username: String,
    pub location: String,
    pub platform: String,
    pub frame_variant: String,
    pub media_type: MediaKind,
    pub image_url: String,
    pub gif_search: String,
    pub gif_url: String,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            game: String::new(),
            username: String::new(),
            location: String::new(),
            platform: DEFAULT_PLATFORM.to_string(),
            frame_variant: FrameVariant::Neon.as_str().to_string(),
            media_type: MediaKind::Image,
            image_url: String::new(),
            gif_search: String::new(),
            gif_url: String::new(),
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl UploadForm {
    /// The URL that will become `media_url`, depending on the media type.
    pub fn media_url(&self) -> &str {
        match self.media_type {
            MediaKind::Image => self.image_url.trim(),
            MediaKind::Gif => self.gif_url.trim(),
        }
    }

    /// Checks required fields in form order and builds the insert payload.
    pub fn validate(&self) -> Result<NewPost> {
        let title = non_blank(&self.title).ok_or_else(|| AppError::validation(MISSING_TITLE))?;
        let username = non_blank(&self.username).ok_or_else(|| AppError::validation(MISSING_USERNAME))?;
        let media_url = non_blank(self.media_url()).ok_or_else(|| AppError::validation(MISSING_MEDIA))?;

        Ok(NewPost {
            title,
            game: non_blank(&self.game),
            username,
            location: non_blank(&self.location),
            platform: non_blank(&self.platform),
            frame_variant: self.frame_variant.parse().ok(),
            media_url,
        })
    }

    /// The GIF search this form asks for, if any, with its result limit.
    ///
    /// A typed query wins; an untouched GIF form opens the picker.
    pub fn gif_query(&self) -> Option<(&str, u32)> {
        let typed = self.gif_search.trim();
        if !typed.is_empty() {
            Some((typed, UPLOAD_GIF_LIMIT))
        } else if self.media_type == MediaKind::Gif && self.gif_url.trim().is_empty() {
            Some((GIF_PICKER_QUERY, GIF_PICKER_LIMIT))
        } else {
            None
        }
    }
}

/// Validates and inserts. A validation error never reaches the store.
pub async fn submit(store: &dyn ContentStore, form: &UploadForm) -> Result<Post> {
    let payload = form.validate()?;
    log::debug!("Submitting post {:?}", payload.title);
    store.insert_post(payload).await.map_err(AppError::Store)
}
