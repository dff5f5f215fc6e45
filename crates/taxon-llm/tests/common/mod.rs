//! Shared wiremock fixtures for provider tests

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn ollama_embed_body(vector: &[f32]) -> Value {
    json!({
        "model": "nomic-embed-text",
        "embeddings": [vector],
        "prompt_eval_count": 3
    })
}

pub fn openai_embed_body(vector: &[f32]) -> Value {
    json!({
        "object": "list",
        "data": [{ "object": "embedding", "index": 0, "embedding": vector }],
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": 4, "total_tokens": 4 }
    })
}

/// Server answering `POST {route}` with `template`.
pub async fn mock_server(route: &str, template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

pub async fn json_server(route: &str, body: Value) -> MockServer {
    mock_server(route, ResponseTemplate::new(200).set_body_json(body)).await
}

pub async fn delayed_server(route: &str, body: Value, delay: Duration) -> MockServer {
    mock_server(
        route,
        ResponseTemplate::new(200)
            .set_body_json(body)
            .set_delay(delay),
    )
    .await
}

pub async fn error_server(route: &str, status: u16, body: &str) -> MockServer {
    mock_server(
        route,
        ResponseTemplate::new(status).set_body_string(body.to_string()),
    )
    .await
}
