//! # gm-gif-giphy
//!
//! GIPHY search implementation of `MediaSearch`.

use anyhow::{bail, Context};
use async_trait::async_trait;
use gm_core::models::MediaCandidate;
use gm_core::traits::MediaSearch;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const GIPHY_API: &str = "https://api.giphy.com";

const RATING: &str = "pg-13";

pub struct GiphySearch {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Gif>,
}

#[derive(Debug, Deserialize)]
struct Gif {
    id: String,
    #[serde(default)]
    title: String,
    /// Page URL on giphy.com
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    images: Images,
}

#[derive(Debug, Default, Deserialize)]
struct Images {
    downsized_medium: Option<Rendition>,
    original: Option<Rendition>,
    fixed_width_small: Option<Rendition>,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    url: Option<String>,
}

fn rendition_url(r: &Option<Rendition>) -> Option<&str> {
    r.as_ref()?.url.as_deref().filter(|u| !u.is_empty())
}

impl Gif {
    /// downsized_medium, then original, then the page URL.
    fn into_candidate(self) -> Option<MediaCandidate> {
        let url = rendition_url(&self.images.downsized_medium)
            .or_else(|| rendition_url(&self.images.original))
            .or(self.url.as_deref())?
            .to_string();
        let preview_url = rendition_url(&self.images.fixed_width_small)
            .map(str::to_string)
            .unwrap_or_else(|| url.clone());

        Some(MediaCandidate {
            id: self.id,
            title: self.title,
            url,
            preview_url,
        })
    }
}

impl GiphySearch {
    pub fn new(api_key: Option<SecretString>) -> anyhow::Result<Self> {
        Self::with_base_url(GIPHY_API, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: Option<SecretString>) -> anyhow::Result<Self> {
        if api_key.is_none() {
            log::warn!("No GIPHY API key configured, GIF search disabled");
        }
        let client = Client::builder().build().context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl MediaSearch for GiphySearch {
    async fn search(&self, query: &str, limit: u32) -> anyhow::Result<Vec<MediaCandidate>> {
        let Some(key) = &self.api_key else {
            bail!("Missing GIPHY API key.");
        };
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit.to_string();
        let response = self
            .client
            .get(format!("{}/v1/gifs/search", self.base_url))
            .query(&[
                ("api_key", key.expose_secret()),
                ("q", query),
                ("limit", limit.as_str()),
                ("rating", RATING),
                ("lang", "en"),
            ])
            .send()
            .await
            .context("GIPHY request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GIPHY error {status}: {body}");
        }

        let parsed: SearchResponse = response.json().await.context("GIPHY response malformed")?;
        Ok(parsed.data.into_iter().filter_map(Gif::into_candidate).collect())
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::upload::{GIF_PICKER_LIMIT, GIF_PICKER_QUERY};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search(server: &MockServer) -> GiphySearch {
        GiphySearch::with_base_url(&server.uri(), Some(SecretString::from("gif-key".to_string()))).unwrap()
    }

    #[tokio::test]
    async fn picks_downsized_then_original_then_page_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/gifs/search"))
            .and(query_param("q", "mario fail"))
            .and(query_param("limit", "12"))
            .and(query_param("rating", "pg-13"))
            .and(query_param("api_key", "gif-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "id": "a", "title": "A", "images": {
                        "downsized_medium": { "url": "https://g/a-med.gif" },
                        "original": { "url": "https://g/a.gif" },
                        "fixed_width_small": { "url": "https://g/a-small.gif" } } },
                    { "id": "b", "title": "B", "images": { "original": { "url": "https://g/b.gif" } } },
                    { "id": "c", "title": "C", "url": "https://giphy.com/c", "images": {} },
                    { "id": "d", "title": "D", "images": {} }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = search(&server).search("mario fail", 12).await.unwrap();

        let urls: Vec<_> = results.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, ["https://g/a-med.gif", "https://g/b.gif", "https://giphy.com/c"]);
        assert_eq!(results[0].preview_url, "https://g/a-small.gif");
        assert_eq!(results[1].preview_url, "https://g/b.gif");
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let server = MockServer::start().await;
        let search = GiphySearch::with_base_url(&server.uri(), None).unwrap();

        assert!(!search.is_enabled());
        let err = search.search(GIF_PICKER_QUERY, GIF_PICKER_LIMIT).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing GIPHY API key.");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_query_returns_nothing() {
        let server = MockServer::start().await;
        assert!(search(&server).search("   ", 12).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = search(&server).search(GIF_PICKER_QUERY, GIF_PICKER_LIMIT).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
