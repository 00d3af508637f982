//! # gm-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! components. Every mutation is an explicit call on the coordinator or
//! the post page; handlers only translate forms in and pages out.

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse, Responder};
use askama::Template;
use gm_core::coordinator::MutationCoordinator;
use gm_core::feed::FeedMode;
use gm_core::models::{Post, PostId};
use gm_core::notice::{Notice, NoticeBoard};
use gm_core::post_page::{PageDelete, PostPage, PostView};
use gm_core::traits::{ContentStore, MediaSearch, DELETE_PROMPT};
use gm_core::upload::{self, MediaKind, UploadForm, POSTED};
use gm_core::{AppError, MutationOutcome};
use gm_ui::views::{self, UploadView};
use gm_ui::{
    CommentRow, ConfirmTemplate, FeedTemplate, NotFoundTemplate, PostCard, PostDetail, PostTemplate,
    UploadTemplate,
};
use log::{error, info, warn};
use serde::Deserialize;

const SITE_TITLE: &str = "GameMe";
const GIF_SEARCH_FAILED: &str = "Failed to load GIFs. Try again.";
const GIF_SEARCH_DISABLED: &str = "Missing GIPHY API key.";

/// State shared across all Actix-web workers.
pub struct AppState {
    /// The feed's post collection and its optimistic mutations
    pub feed: MutationCoordinator,
    pub page: PostPage,
    pub store: Arc<dyn ContentStore>,
    pub media: Arc<dyn MediaSearch>,
    pub notices: Arc<NoticeBoard>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, media: Arc<dyn MediaSearch>) -> Self {
        Self::with_posts(store, media, Vec::new())
    }

    pub fn with_posts(store: Arc<dyn ContentStore>, media: Arc<dyn MediaSearch>, posts: Vec<Post>) -> Self {
        let notices = Arc::new(NoticeBoard::new());
        Self {
            feed: MutationCoordinator::with_posts(store.clone(), notices.clone(), posts),
            page: PostPage::new(store.clone(), notices.clone()),
            store,
            media,
            notices,
        }
    }

    fn drain_notices(&self) -> Vec<gm_ui::NoticeView> {
        views::notices(self.notices.drain())
    }
}

fn render<T: Template>(template: &T, status: StatusCode) -> HttpResponse {
    match template.render() {
        Ok(html) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(err) => {
            error!("Template rendering failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn not_found(data: &AppState) -> HttpResponse {
    let template = NotFoundTemplate {
        title: "Post not found",
        active: "",
        notices: data.drain_notices(),
    };
    render(&template, StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub mode: Option<String>,
}

/// Renders the home feed (e.g., /?mode=top)
pub async fn index(data: web::Data<AppState>, query: web::Query<FeedQuery>) -> impl Responder {
    let mode = FeedMode::from_param(query.mode.as_deref());
    let cards = data.feed.view(mode).iter().map(PostCard::from).collect();

    let template = FeedTemplate {
        title: SITE_TITLE,
        active: "home",
        notices: data.drain_notices(),
        mode: mode.as_str(),
        cards,
    };
    render(&template, StatusCode::OK)
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[derive(Debug, Deserialize)]
pub struct LikeForm {
    pub mode: Option<String>,
}

/// Feed like: optimistic, rolled back by the coordinator on failure.
pub async fn like_post(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: Option<web::Form<LikeForm>>,
) -> impl Responder {
    let id = PostId::from(path.into_inner());
    data.feed.increment_like(&id).await;

    // A bodiless POST still likes; it just lands on the default mode
    let mode = FeedMode::from_param(form.as_ref().and_then(|f| f.mode.as_deref()));
    see_other(&format!("/?mode={mode}"))
}

/// Where a delete was started from; decides which delete policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Feed,
    Page,
}

impl Origin {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("page") => Origin::Page,
            _ => Origin::Feed,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Origin::Feed => "feed",
            Origin::Page => "page",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OriginQuery {
    pub origin: Option<String>,
}

/// The confirmation prompt shown before any delete.
pub async fn confirm_delete(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OriginQuery>,
) -> impl Responder {
    let id = PostId::from(path.into_inner());
    let origin = Origin::parse(query.origin.as_deref());

    let post = match origin {
        Origin::Feed => data.feed.post(&id),
        Origin::Page => data.store.fetch_post(&id).await.unwrap_or_else(|err| {
            warn!("Error loading post {id}: {err:#}");
            None
        }),
    };
    let Some(post) = post else {
        return not_found(&data);
    };

    let template = ConfirmTemplate {
        title: "Delete post",
        active: "",
        notices: data.drain_notices(),
        prompt: DELETE_PROMPT,
        post_id: id.as_str(),
        post_title: &post.title,
        origin: origin.as_str(),
    };
    render(&template, StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub confirm: Option<String>,
    pub origin: Option<String>,
}

/// Answers the confirmation prompt.
///
/// From the feed the delete is optimistic with a full-collection rollback;
/// from the post page nothing changes until the store agrees.
pub async fn delete_post(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<DeleteForm>,
) -> impl Responder {
    let id = PostId::from(path.into_inner());
    let confirmed = form.confirm.as_deref() == Some("yes");

    match Origin::parse(form.origin.as_deref()) {
        Origin::Feed => {
            data.feed.delete(&id, &confirmed).await;
            see_other("/")
        }
        Origin::Page => match data.page.delete(&id, &confirmed).await {
            PageDelete::Deleted => {
                data.feed.evict(&id);
                see_other("/")
            }
            PageDelete::Failed | PageDelete::Declined | PageDelete::Busy => see_other(&format!("/post/{id}")),
        },
    }
}

/// Renders a single post with its comments (e.g., /post/42)
pub async fn view_post(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = PostId::from(path.into_inner());
    render_post(&data, &id, "").await
}

async fn render_post(data: &AppState, id: &PostId, comment_author: &str) -> HttpResponse {
    match data.page.load(id).await {
        PostView::Found { post, comments } => {
            let template = PostTemplate {
                title: &post.title,
                active: "",
                notices: data.drain_notices(),
                post: PostDetail::from(&post),
                comments: comments.iter().map(CommentRow::from).collect(),
                comment_author,
            };
            render(&template, StatusCode::OK)
        }
        PostView::NotFound => not_found(data),
    }
}

/// Post page like: guarded against double submits, synced into the feed once confirmed.
pub async fn like_from_page(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = PostId::from(path.into_inner());

    match data.store.fetch_post(&id).await {
        Ok(Some(mut post)) => {
            if data.page.like(&mut post).await == MutationOutcome::Confirmed {
                data.feed.sync(post);
            }
        }
        Ok(None) => {}
        Err(err) => warn!("Error loading post {id}: {err:#}"),
    }
    see_other(&format!("/post/{id}"))
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
}

/// Adds a comment and redraws the page, keeping the author name filled in.
pub async fn add_comment(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> impl Responder {
    let id = PostId::from(path.into_inner());
    data.page.add_comment(&id, &form.author, &form.body).await;
    render_post(&data, &id, form.author.trim()).await
}

fn upload_page(data: &AppState, view: UploadView, error: Option<String>, status: StatusCode) -> HttpResponse {
    let template = UploadTemplate {
        title: "Upload Screenshot",
        active: "upload",
        notices: data.drain_notices(),
        error,
        view,
    };
    render(&template, status)
}

/// The upload form. Runs a GIF search first when the form asks for one.
pub async fn upload_form(data: web::Data<AppState>, query: web::Query<UploadForm>) -> impl Responder {
    let mut form = query.into_inner();
    let mut results = Vec::new();

    if let Some((gif_query, limit)) = form.gif_query() {
        if !data.media.is_enabled() {
            data.notices.push(Notice::error(GIF_SEARCH_DISABLED));
        } else {
            match data.media.search(gif_query, limit).await {
                Ok(found) => results = found,
                Err(err) => {
                    error!("Error fetching GIFs: {err:#}");
                    data.notices.push(Notice::error(GIF_SEARCH_FAILED));
                }
            }
        }
        form.media_type = MediaKind::Gif;
    }

    let view = UploadView::new(form, &results, data.media.is_enabled());
    upload_page(&data, view, None, StatusCode::OK)
}

/// Validates and creates a post, then shows it at the top of the newest feed.
pub async fn submit_upload(data: web::Data<AppState>, form: web::Form<UploadForm>) -> impl Responder {
    let form = form.into_inner();

    match upload::submit(data.store.as_ref(), &form).await {
        Ok(post) => {
            info!("Created post {} ({})", post.id, post.title);
            data.feed.prepend(post);
            data.notices.push(Notice::success(POSTED));
            see_other(&format!("/?mode={}", FeedMode::Newest))
        }
        Err(AppError::ValidationError(message)) => {
            let enabled = data.media.is_enabled();
            upload_page(&data, UploadView::new(form, &[], enabled), Some(message), StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(AppError::Store(source)) => {
            error!("Error inserting post: {source:#}");
            let message = format!("Something went wrong saving your post: {source:#}");
            let enabled = data.media.is_enabled();
            upload_page(&data, UploadView::new(form, &[], enabled), Some(message), StatusCode::BAD_GATEWAY)
        }
    }
}
