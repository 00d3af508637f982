//! # GameMe Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod config;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use gm_api::middleware::{cors_policy, security_headers, standard_middleware};
use gm_api::{configure_routes, AppState};
use gm_core::traits::{ContentStore, MediaSearch};
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Backend, Settings};

#[cfg(not(any(feature = "store-rest", feature = "db-sqlite")))]
compile_error!("enable at least one store plugin: `store-rest` or `db-sqlite`");

#[cfg(feature = "store-rest")]
use gm_store_rest::RestContentStore;

#[cfg(feature = "db-sqlite")]
use gm_db_sqlite::SqliteContentStore;

#[cfg(feature = "gif-giphy")]
use gm_gif_giphy::GiphySearch;

/// Hands a plugin its own copy of a secret.
fn reveal(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

async fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn ContentStore>> {
    match settings.backend {
        #[cfg(feature = "store-rest")]
        Backend::Rest => {
            let store = RestContentStore::new(&settings.store_url, reveal(&settings.store_key))
                .context("Failed to init REST store")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "db-sqlite")]
        Backend::Sqlite => {
            let store = SqliteContentStore::new(&settings.sqlite_url)
                .await
                .context("Failed to init SQLite")?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => bail!("backend {other:?} was not compiled into this build"),
    }
}

#[cfg(feature = "gif-giphy")]
fn build_media(settings: &Settings) -> anyhow::Result<Arc<dyn MediaSearch>> {
    Ok(Arc::new(GiphySearch::new(settings.giphy_key.as_ref().map(reveal))?))
}

#[cfg(not(feature = "gif-giphy"))]
fn build_media(_settings: &Settings) -> anyhow::Result<Arc<dyn MediaSearch>> {
    Ok(Arc::new(NoMediaSearch))
}

/// Stand-in when no GIF plugin is compiled in.
#[cfg(not(feature = "gif-giphy"))]
struct NoMediaSearch;

#[cfg(not(feature = "gif-giphy"))]
#[async_trait::async_trait]
impl MediaSearch for NoMediaSearch {
    async fn search(&self, _query: &str, _limit: u32) -> anyhow::Result<Vec<gm_core::models::MediaCandidate>> {
        bail!("GIF search is not available in this build")
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // 1. Settings
    let settings = Settings::from_env().context("Failed to read configuration")?;
    settings.validate()?;

    // 2. Plugins
    let store = build_store(&settings).await?;
    let media = build_media(&settings)?;

    // 3. Shared state, seeded with the initial feed
    let state = web::Data::new(AppState::new(store, media));
    state.feed.load().await;

    log::info!(
        "🎮 GameMe starting on http://{}:{} ({:?} store, {} worker(s))",
        settings.host,
        settings.port,
        settings.backend,
        settings.workers
    );

    HttpServer::new(move || {
        App::new()
            .wrap(standard_middleware())
            .wrap(cors_policy())
            .wrap(security_headers())
            .app_data(state.clone())
            .service(actix_files::Files::new("/static", concat!(env!("CARGO_MANIFEST_DIR"), "/static")))
            .configure(configure_routes)
    })
    .workers(settings.workers)
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
