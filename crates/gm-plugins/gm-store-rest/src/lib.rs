//! # gm-store-rest
//!
//! `ContentStore` over a hosted PostgREST endpoint (the Supabase REST
//! surface). Every call is a single HTTP request; nothing is cached and
//! nothing is retried.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use gm_core::models::{Comment, NewComment, NewPost, Post, PostId, PostPatch};
use gm_core::traits::ContentStore;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

const POSTS: &str = "posts";
const COMMENTS: &str = "comments";

pub struct RestContentStore {
    client: Client,
    /// Project URL, e.g. "https://abc.supabase.co"
    base_url: String,
    api_key: SecretString,
}

impl RestContentStore {
    pub fn new(base_url: &str, api_key: SecretString) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gameme/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        log::info!("REST store targeting {base_url}");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request against `table` carrying the project key.
    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> anyhow::Result<Response> {
        let response = request.send().await.with_context(|| format!("{what}: request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("{what}: store answered {status}: {body}");
        }
        Ok(response)
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> anyhow::Result<Vec<T>> {
        self.send(request, what)
            .await?
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("{what}: malformed response"))
    }

    /// Inserts one row and reads back the stored representation.
    async fn insert_one<B, T>(&self, table: &str, body: &B, what: &str) -> anyhow::Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);

        self.rows::<T>(request, what)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("{what}: store returned no row"))
    }
}

fn eq(id: &PostId) -> String {
    format!("eq.{id}")
}

#[async_trait]
impl ContentStore for RestContentStore {
    async fn fetch_posts(&self) -> anyhow::Result<Vec<Post>> {
        let request = self
            .request(Method::GET, POSTS)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.rows(request, "fetch posts").await
    }

    async fn fetch_post(&self, id: &PostId) -> anyhow::Result<Option<Post>> {
        let request = self
            .request(Method::GET, POSTS)
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        Ok(self.rows(request, "fetch post").await?.into_iter().next())
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        self.insert_one(POSTS, &post, "insert post").await
    }

    async fn update_post(&self, id: &PostId, patch: PostPatch) -> anyhow::Result<()> {
        let request = self
            .request(Method::PATCH, POSTS)
            .query(&[("id", eq(id))])
            .header("Prefer", "return=minimal")
            .json(&patch);
        self.send(request, "update post").await?;
        Ok(())
    }

    async fn delete_post(&self, id: &PostId) -> anyhow::Result<()> {
        let request = self.request(Method::DELETE, POSTS).query(&[("id", eq(id))]);
        self.send(request, "delete post").await?;
        Ok(())
    }

    async fn fetch_comments(&self, post_id: &PostId) -> anyhow::Result<Vec<Comment>> {
        let request = self.request(Method::GET, COMMENTS).query(&[
            ("select", "*".to_string()),
            ("post_id", eq(post_id)),
            ("order", "created_at.asc".to_string()),
        ]);
        self.rows(request, "fetch comments").await
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        self.insert_one(COMMENTS, &comment, "insert comment").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(id: i64, upvotes: i64) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("shot {id}"),
            "game": "Hades",
            "username": "zag",
            "location": null,
            "platform": "PC",
            "frame_variant": "screen",
            "media_url": format!("https://cdn.example/{id}.png"),
            "created_at": "2025-11-05T15:04:00+00:00",
            "upvotes": upvotes
        })
    }

    fn store(server: &MockServer) -> RestContentStore {
        RestContentStore::new(&server.uri(), SecretString::from("anon-key".to_string())).unwrap()
    }

    #[tokio::test]
    async fn fetch_posts_orders_newest_first_and_sends_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(2, 3), row(1, 0)])))
            .expect(1)
            .mount(&server)
            .await;

        let posts = store(&server).fetch_posts().await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.as_str(), "2");
        assert_eq!(posts[0].like_count, 3);
    }

    #[tokio::test]
    async fn fetch_post_with_no_rows_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("id", "eq.99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(store(&server).fetch_post(&"99".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_sends_only_the_patched_column() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/posts"))
            .and(query_param("id", "eq.7"))
            .and(body_json(json!({ "upvotes": 12 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .update_post(&"7".into(), PostPatch::like_count(12))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn store_error_status_becomes_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/posts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
            .mount(&server)
            .await;

        let err = store(&server).delete_post(&"7".into()).await.unwrap_err();
        assert!(format!("{err:#}").contains("JWT expired"));
    }

    #[tokio::test]
    async fn insert_reads_back_the_created_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/posts"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(5, 0)])))
            .expect(1)
            .mount(&server)
            .await;

        let created = store(&server)
            .insert_post(NewPost {
                title: "shot 5".into(),
                game: None,
                username: "zag".into(),
                location: None,
                platform: None,
                frame_variant: None,
                media_url: "https://cdn.example/5.png".into(),
            })
            .await
            .unwrap();

        assert_eq!(created.id.as_str(), "5");
    }

    #[tokio::test]
    async fn comments_are_filtered_by_post_and_ordered_oldest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/comments"))
            .and(query_param("post_id", "eq.5"))
            .and(query_param("order", "created_at.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "post_id": 5,
                "author": "Anonymous",
                "body": "gg",
                "created_at": "2025-11-05T16:00:00Z"
            }])))
            .mount(&server)
            .await;

        let comments = store(&server).fetch_comments(&"5".into()).await.unwrap();
        assert_eq!(comments[0].post_id.as_str(), "5");
        assert_eq!(comments[0].body, "gg");
    }
}
