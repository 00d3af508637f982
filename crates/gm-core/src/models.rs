//! # Domain Models
//!
//! These structs represent the core entities of GameMe. Field names on the
//! wire follow the column names of the hosted store (`upvotes`,
//! `frame_variant`, `media_url`, ...), the Rust names follow the domain.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Author name shown for comments posted without a name.
pub const ANONYMOUS: &str = "Anonymous";

/// Platforms offered by the upload form. Stored as free text.
pub const PLATFORMS: [&str; 4] = ["Console", "PC", "Handheld", "Arcade"];

/// Pre-selected platform on a blank upload form.
pub const DEFAULT_PLATFORM: &str = "Console";

/// Opaque, stable record identifier.
///
/// Hosted stores hand these out either as integers or as strings (UUIDs);
/// both are kept as text so nothing downstream cares which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

pub type PostId = RecordId;
pub type CommentId = RecordId;

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Decorative frame drawn around a screenshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameVariant {
    #[default]
    Neon,
    Cartridge,
    Screen,
}

impl FrameVariant {
    pub const ALL: [FrameVariant; 3] = [FrameVariant::Neon, FrameVariant::Cartridge, FrameVariant::Screen];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameVariant::Neon => "neon",
            FrameVariant::Cartridge => "cartridge",
            FrameVariant::Screen => "screen",
        }
    }

    /// Label used by the upload form's frame selector.
    pub fn label(&self) -> &'static str {
        match self {
            FrameVariant::Neon => "Neon Frame",
            FrameVariant::Cartridge => "Cartridge Frame",
            FrameVariant::Screen => "Purple Screen",
        }
    }
}

impl fmt::Display for FrameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "neon" => Ok(FrameVariant::Neon),
            "cartridge" => Ok(FrameVariant::Cartridge),
            "screen" => Ok(FrameVariant::Screen),
            other => Err(format!("unknown frame variant `{other}`")),
        }
    }
}

/// A shared screenshot or GIF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub game: Option<String>,
    /// Author handle, shown as `@username`
    pub username: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    /// Unknown or missing styles read as `None`; renderers pick a fallback.
    #[serde(default, deserialize_with = "lenient_frame")]
    pub frame_variant: Option<FrameVariant>,
    pub media_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "upvotes", default, deserialize_with = "null_as_zero")]
    pub like_count: u32,
}

/// Insert payload for a post. The store fills in id, timestamp and likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub game: Option<String>,
    pub username: String,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub frame_variant: Option<FrameVariant>,
    pub media_url: String,
}

/// Partial update of a post. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(rename = "upvotes", skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u32>,
}

impl PostPatch {
    pub fn like_count(count: u32) -> Self {
        Self { like_count: Some(count) }
    }
}

/// A reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn display_author(&self) -> &str {
        match self.author.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS,
        }
    }
}

/// Insert payload for a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub author: String,
    pub body: String,
}

/// One hit from the media search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub id: String,
    pub title: String,
    /// URL stored as the post's `media_url` when picked
    pub url: String,
    /// Smaller rendition for result grids
    pub preview_url: String,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

fn lenient_frame<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<FrameVariant>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_reads_store_row_with_null_upvotes_and_numeric_id() {
        let post: Post = serde_json::from_value(json!({
            "id": 42,
            "title": "Clutch",
            "game": null,
            "username": "carl",
            "location": "El Paso, TX",
            "platform": "Console",
            "frame_variant": "glitter",
            "media_url": "https://cdn.example/clutch.gif",
            "created_at": "2025-11-05T15:04:00Z",
            "upvotes": null
        }))
        .unwrap();

        assert_eq!(post.id.as_str(), "42");
        assert_eq!(post.like_count, 0);
        assert_eq!(post.frame_variant, None);
        assert_eq!(post.location.as_deref(), Some("El Paso, TX"));
    }

    #[test]
    fn patch_only_serializes_present_fields() {
        assert_eq!(serde_json::to_value(PostPatch::default()).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(PostPatch::like_count(7)).unwrap(), json!({ "upvotes": 7 }));
    }

    #[test]
    fn blank_comment_author_displays_as_anonymous() {
        let mut comment = Comment {
            id: "c1".into(),
            post_id: "p1".into(),
            author: Some("   ".into()),
            body: "gg".into(),
            created_at: Utc::now(),
        };
        assert_eq!(comment.display_author(), ANONYMOUS);

        comment.author = Some("Toad".into());
        assert_eq!(comment.display_author(), "Toad");
    }
}
