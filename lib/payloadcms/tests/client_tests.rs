//! Integration tests for the request pipeline using wiremock.

use std::time::Duration;

use assert2::{check, let_assert};
use payloadcms::{Client, Error, Method, RequestOption};
use serde::{Deserialize, Serialize};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Resource {
    id: u64,
    name: String,
}

fn client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .api_key("test-key")
        .build()
        .expect("client")
}

#[tokio::test]
async fn decodes_success_and_keeps_raw_content() {
    let server = MockServer::start().await;
    let body = r#"{"id": 1, "name": "John Doe"}"#;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .and(header("Authorization", "users API-Key test-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let decoded = client(&server)
        .get::<Resource>("/api/resource")
        .await
        .expect("response");

    check!(
        decoded.value
            == Resource {
                id: 1,
                name: "John Doe".to_string()
            }
    );
    check!(decoded.response.status() == 200);
    check!(decoded.response.content().as_ref() == body.as_bytes());
    check!(decoded.response.errors().is_empty());
}

#[tokio::test]
async fn posts_json_body() {
    let server = MockServer::start().await;
    let input = Resource {
        id: 0,
        name: "Bob".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/api/resource"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .post("/api/resource", &input)
        .await
        .expect("response");
    check!(response.status() == 201);
}

#[tokio::test]
async fn no_body_on_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let_assert!(Err(err) = client(&server).get::<Resource>("/api/resource").await);
    check!(
        err.to_string()
            .contains("received no body with status code: 405 Method Not Allowed")
    );
    let_assert!(Some(response) = err.response());
    check!(response.status() == 405);
}

#[tokio::test]
async fn undecodable_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .respond_with(ResponseTemplate::new(500).set_body_string("wrong"))
        .mount(&server)
        .await;

    let_assert!(Err(err) = client(&server).get::<Resource>("/api/resource").await);
    check!(err.to_string().starts_with("failed to unmarshal error response: "));
    let_assert!(Some(response) = err.response());
    check!(response.content().as_ref() == b"wrong");
}

#[tokio::test]
async fn api_errors_are_aggregated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"errors":[{"message":"You are not allowed to perform this action."}]}"#,
        ))
        .mount(&server)
        .await;

    let_assert!(Err(err) = client(&server).get::<Resource>("/api/resource").await);
    check!(
        err.to_string()
            == "unexpected status code: 400, errors: You are not allowed to perform this action."
    );
    let_assert!(Some(response) = err.response());
    check!(response.errors().len() == 1);
    check!(response.errors().to_string() == "You are not allowed to perform this action.");
}

#[tokio::test]
async fn success_with_wrong_shape_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"one"}"#))
        .mount(&server)
        .await;

    let_assert!(Err(err) = client(&server).get::<Resource>("/api/resource").await);
    let_assert!(Error::Decode { path, .. } = &err);
    check!(path == "id");
    check!(err.status() == Some(200));
    let_assert!(Some(response) = err.response());
    check!(response.content().as_ref() == br#"{"id":"one"}"#);
}

#[tokio::test]
async fn prepared_request_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource/1"))
        .and(query_param("draft", "true"))
        .and(header("Authorization", "users API-Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"name":"Draft"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut request = client
        .new_request(Method::Get, "/api/resource/1", None)
        .expect("request");
    request.url_mut().query_pairs_mut().append_pair("draft", "true");

    let decoded = client
        .execute_request_json::<Resource>(request)
        .await
        .expect("response");
    check!(decoded.value.name == "Draft");
    check!(decoded.response.status() == 200);
}

#[tokio::test]
async fn request_options_reach_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/1"))
        .and(query_param("depth", "2"))
        .and(query_param("locale", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .execute::<()>(
            Method::Get,
            "/api/posts/1",
            None,
            &[
                RequestOption::depth(2),
                RequestOption::query_param("locale", "fr"),
            ],
        )
        .await
        .expect("response");
}

#[tokio::test]
async fn base_url_trailing_slash() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/posts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":7,"name":"gone"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/", server.uri()))
        .build()
        .expect("client");

    let deleted = client
        .delete::<Resource>("/api/posts/7")
        .await
        .expect("response");
    check!(deleted.value.id == 7);
}

#[tokio::test]
async fn timeout_covers_slow_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .expect("client");

    let_assert!(Err(err) = client.get::<serde_json::Value>("/api/slow").await);
    check!(err.is_timeout());
}

#[tokio::test]
async fn connection_refused() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .expect("client");

    let_assert!(Err(err) = client.get::<serde_json::Value>("/api/posts").await);
    check!(err.is_connection());
}

#[tokio::test]
async fn client_is_shared_across_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"name":"a"}"#))
        .expect(4)
        .mount(&server)
        .await;

    let client = client(&server);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Resource>("/api/resource").await })
        })
        .collect();

    for handle in handles {
        let decoded = handle.await.expect("join").expect("response");
        check!(decoded.value.id == 1);
    }
}

#[tokio::test]
async fn put_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/resource/1"))
        .and(body_json(serde_json::json!({"name": "Updated"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"name":"Updated"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .put("/api/resource/1", &serde_json::json!({"name": "Updated"}))
        .await
        .expect("response");
    let updated: Resource = response.json().expect("json");
    check!(updated.name == "Updated");
}
