//! Blog demo
//!
//! Lists published posts, reads the site settings global and optionally
//! uploads an image against a running Payload instance.
//!
//! ```sh
//! PAYLOAD_URL=http://localhost:3000 PAYLOAD_API_KEY=... \
//!     RUST_LOG=payloadcms=debug cargo run -p blog-demo -- ./cover.png
//! ```

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use payloadcms::prelude::*;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Data Types
// ============================================================================

/// A blog post as returned by the `posts` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, rename = "_status")]
    pub status: Option<String>,
}

/// The `settings` global.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(rename = "siteName")]
    pub site_name: String,
}

// ============================================================================
// Operations
// ============================================================================

async fn published_posts<T: Transport>(
    client: &Client<T>,
    limit: u32,
) -> Result<ListResponse<Post>> {
    let params = ListParams::new()
        .sort("-createdAt")
        .filter(QueryBuilder::new().equals("_status", "published"))
        .limit(limit);

    let page = client
        .collections()
        .list::<ListResponse<Post>>("posts", &params, &[RequestOption::depth(0)])
        .await?;
    Ok(page.value)
}

async fn site_name<T: Transport>(client: &Client<T>) -> Result<String> {
    let settings = client
        .globals()
        .get::<Settings>("settings", &[])
        .await?;
    Ok(settings.value.site_name)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url =
        std::env::var("PAYLOAD_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let mut builder = Client::builder().base_url(base_url);
    if let Ok(key) = std::env::var("PAYLOAD_API_KEY") {
        builder = builder.api_key(key);
    }
    let client = builder.build()?;

    match site_name(&client).await {
        Ok(name) => println!("Site: {name}"),
        Err(err) if err.is_not_found() => println!("Site: <no settings global>"),
        Err(err) => return Err(err),
    }

    let page = published_posts(&client, 10).await?;
    println!(
        "Published posts: {} (page {}/{})",
        page.total_docs, page.page, page.total_pages
    );
    for post in &page.docs {
        println!("  - [{}] {}", post.id, post.title);
    }

    if let Some(file) = std::env::args().nth(1) {
        let response = client
            .media()
            .upload_file(
                &file,
                &serde_json::json!({ "alt": "Uploaded from the blog demo" }),
                &MediaOptions::new(),
            )
            .await?;
        println!("Uploaded {file}: status {}", response.status());
    }

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================

#[cfg(test)]
mod tests {
    use assert2::check;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    #[tokio::test]
    async fn lists_published_posts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/posts"))
            .and(query_param("where[_status][equals]", "published"))
            .and(query_param("limit", "5"))
            .and(query_param("depth", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "docs": [{"id": "p1", "title": "Hello", "slug": "hello", "_status": "published"}],
                "totalDocs": 1,
                "limit": 5,
                "totalPages": 1,
                "page": 1,
                "pagingCounter": 1,
                "hasPrevPage": false,
                "hasNextPage": false,
                "prevPage": null,
                "nextPage": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::builder()
            .base_url(server.uri())
            .build()
            .expect("client");

        let page = published_posts(&client, 5).await.expect("posts");
        check!(page.total_docs == 1);
        check!(page.docs.first().and_then(|p| p.slug.as_deref()) == Some("hello"));
    }

    #[tokio::test]
    async fn reads_site_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/globals/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"siteName": "Blog"})))
            .mount(&server)
            .await;

        let client = Client::builder()
            .base_url(server.uri())
            .build()
            .expect("client");

        check!(site_name(&client).await.expect("settings") == "Blog");
    }
}
