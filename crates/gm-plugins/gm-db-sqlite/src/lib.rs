//! # gm-db-sqlite Implementation
//!
//! A local `ContentStore` for development and offline use. Maps the SQLite
//! relational model onto the `gm-core` domain models with the same
//! semantics as the hosted store: newest-first posts, oldest-first
//! comments, store-generated ids and timestamps.

use std::str::FromStr;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gm_core::models::{Comment, NewComment, NewPost, Post, PostId, PostPatch};
use gm_core::traits::ContentStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    game          TEXT,
    username      TEXT NOT NULL,
    location      TEXT,
    platform      TEXT,
    frame_variant TEXT,
    media_url     TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    upvotes       INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS comments (
    id         TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    author     TEXT,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS comments_post_id ON comments(post_id);
"#;

pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// # Developer Note
    /// An in-memory database lives and dies with its connection, so the
    /// pool is pinned to one connection for `:memory:` URLs.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        pool.execute(SCHEMA).await.context("Failed to apply schema")?;
        log::info!("SQLite store ready at {url}");

        Ok(Self { pool })
    }
}

fn row_to_post(row: &SqliteRow) -> anyhow::Result<Post> {
    let frame: Option<String> = row.try_get("frame_variant")?;
    Ok(Post {
        id: PostId::from(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        game: row.try_get("game")?,
        username: row.try_get("username")?,
        location: row.try_get("location")?,
        platform: row.try_get("platform")?,
        frame_variant: frame.and_then(|f| f.parse().ok()),
        media_url: row.try_get("media_url")?,
        created_at: row.try_get("created_at")?,
        like_count: row.try_get("upvotes")?,
    })
}

fn row_to_comment(row: &SqliteRow) -> anyhow::Result<Comment> {
    Ok(Comment {
        id: row.try_get::<String, _>("id")?.into(),
        post_id: row.try_get::<String, _>("post_id")?.into(),
        author: row.try_get("author")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn fetch_posts(&self) -> anyhow::Result<Vec<Post>> {
        sqlx::query("SELECT * FROM posts ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_post)
            .collect()
    }

    async fn fetch_post(&self, id: &PostId) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let created = Post {
            id: PostId::from(Uuid::now_v7().to_string()),
            title: post.title,
            game: post.game,
            username: post.username,
            location: post.location,
            platform: post.platform,
            frame_variant: post.frame_variant,
            media_url: post.media_url,
            created_at: Utc::now(),
            like_count: 0,
        };

        sqlx::query(
            "INSERT INTO posts (id, title, game, username, location, platform, frame_variant, media_url, created_at, upvotes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id.as_str())
        .bind(&created.title)
        .bind(&created.game)
        .bind(&created.username)
        .bind(&created.location)
        .bind(&created.platform)
        .bind(created.frame_variant.map(|f| f.as_str()))
        .bind(&created.media_url)
        .bind(created.created_at)
        .bind(created.like_count)
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_post(&self, id: &PostId, patch: PostPatch) -> anyhow::Result<()> {
        let Some(count) = patch.like_count else {
            return Ok(());
        };

        let result = sqlx::query("UPDATE posts SET upvotes = ? WHERE id = ?")
            .bind(count)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("post {id} does not exist");
        }
        Ok(())
    }

    async fn delete_post(&self, id: &PostId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fetch_comments(&self, post_id: &PostId) -> anyhow::Result<Vec<Comment>> {
        sqlx::query("SELECT * FROM comments WHERE post_id = ? ORDER BY created_at ASC, id ASC")
            .bind(post_id.as_str())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_comment)
            .collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        let created_at: DateTime<Utc> = Utc::now();
        let created = Comment {
            id: Uuid::now_v7().to_string().into(),
            post_id: comment.post_id,
            author: Some(comment.author),
            body: comment.body,
            created_at,
        };

        sqlx::query("INSERT INTO comments (id, post_id, author, body, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(created.id.as_str())
            .bind(created.post_id.as_str())
            .bind(&created.author)
            .bind(&created.body)
            .bind(created.created_at)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to add comment to post {}", created.post_id))?;

        Ok(created)
    }
}
