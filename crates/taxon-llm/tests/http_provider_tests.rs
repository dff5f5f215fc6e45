//! HTTP embedding provider tests
//!
//! wiremock stands in for Ollama and OpenAI so request shape, response
//! parsing and error mapping can be checked without a live service.

mod common;

use common::{
    delayed_server, error_server, json_server, mock_server, ollama_embed_body, openai_embed_body,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use taxon_config::{EmbeddingConfig, EmbeddingProviderType};
use taxon_core::test_support::MockTaxonomyStore;
use taxon_core::traits::parse_embedding;
use taxon_core::{InputRecord, TaxonomyBuilder, TaxonomyReader, TaxonomyStore};
use taxon_llm::{create_provider, EmbeddingError, EmbeddingProvider, OllamaProvider, OpenAIProvider};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_config(url: &str) -> EmbeddingConfig {
    EmbeddingConfig {
        provider: EmbeddingProviderType::Ollama,
        api_url: Some(url.to_string()),
        model: Some("nomic-embed-text".to_string()),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn openai_config(url: &str) -> EmbeddingConfig {
    EmbeddingConfig {
        provider: EmbeddingProviderType::OpenAI,
        api_url: Some(url.to_string()),
        api_key: Some("sk-test".to_string()),
        timeout_seconds: 5,
        ..Default::default()
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[tokio::test]
async fn test_ollama_embed_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({ "model": "nomic-embed-text", "input": "Ruling families" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_embed_body(&[0.5, -0.25])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let response = provider.embed("Ruling families").await.unwrap();

    assert_eq!(response.embedding, vec![0.5, -0.25]);
    assert_eq!(response.dimensions, 2);
    assert_eq!(response.model, "nomic-embed-text");
    assert_eq!(response.tokens, Some(3));
}

#[tokio::test]
async fn test_ollama_http_500() {
    let server = error_server("/api/embed", 500, r#"{"error":"model crashed"}"#).await;
    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();

    match provider.embed("text").await.unwrap_err() {
        EmbeddingError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("model crashed"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ollama_malformed_body() {
    let server = json_server("/api/embed", json!({ "unexpected": true })).await;
    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_ollama_empty_embeddings_array() {
    let server = json_server("/api/embed", json!({ "embeddings": [] })).await;
    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_ollama_client_timeout() {
    let server = delayed_server(
        "/api/embed",
        ollama_embed_body(&[0.1]),
        Duration::from_secs(3),
    )
    .await;
    let config = EmbeddingConfig {
        timeout_seconds: 1,
        ..ollama_config(&server.uri())
    };
    let provider = OllamaProvider::new(&config).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::Timeout(1000)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    // Nothing listens on port 9 (discard) in the test environment.
    let provider = OllamaProvider::new(&ollama_config("http://127.0.0.1:9")).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    assert!(
        matches!(err, EmbeddingError::Unavailable(_) | EmbeddingError::Http(_)),
        "unexpected error: {:?}",
        err
    );
}

// ============================================================================
// OpenAI
// ============================================================================

#[tokio::test]
async fn test_openai_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_embed_body(&[1.0, 0.0, -1.0])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(&openai_config(&server.uri())).unwrap();
    let response = provider.embed("Text B").await.unwrap();

    assert_eq!(response.embedding, vec![1.0, 0.0, -1.0]);
    assert_eq!(response.model, "text-embedding-3-small");
    assert_eq!(response.tokens, Some(4));
}

#[tokio::test]
async fn test_openai_error_message_extracted() {
    let body = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
    let server = error_server("/embeddings", 429, body).await;
    let provider = OpenAIProvider::new(&openai_config(&server.uri())).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    match &err {
        EmbeddingError::Api { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_openai_empty_data() {
    let server = json_server(
        "/embeddings",
        json!({ "data": [], "model": "text-embedding-3-small" }),
    )
    .await;
    let provider = OpenAIProvider::new(&openai_config(&server.uri())).unwrap();

    let err = provider.embed("text").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

// ============================================================================
// Builder wiring
// ============================================================================

#[tokio::test]
async fn test_builder_with_http_provider() {
    let server = json_server("/api/embed", ollama_embed_body(&[0.25, 0.75])).await;
    let provider = create_provider(&ollama_config(&server.uri()))
        .unwrap()
        .unwrap();

    let store = MockTaxonomyStore::default();
    let root = store.ensure_root("Thing").await.unwrap();
    let records = vec![
        InputRecord::new(0, Some(-1), "Kings").with_summary("Text A"),
        InputRecord::new(1, Some(0), "Kings").with_summary("Text B"),
    ];

    let outcome = TaxonomyBuilder::new(Arc::new(store.clone()))
        .with_embedder(provider)
        .build(&records, &root)
        .await
        .unwrap();
    assert_eq!(outcome.report.embeddings_set, 2);

    let node = store.get_node("Kings_1").await.unwrap().unwrap();
    assert_eq!(
        parse_embedding(node.summary_embedding().unwrap()).unwrap(),
        vec![0.25, 0.75]
    );
}

#[tokio::test]
async fn test_builder_survives_failing_service() {
    let server = mock_server("/api/embed", ResponseTemplate::new(503)).await;
    let provider = create_provider(&ollama_config(&server.uri()))
        .unwrap()
        .unwrap();

    let store = MockTaxonomyStore::default();
    let root = store.ensure_root("Thing").await.unwrap();
    let records = vec![InputRecord::new(0, Some(-1), "Kings").with_summary("Text A")];

    let outcome = TaxonomyBuilder::new(Arc::new(store.clone()))
        .with_embedder(provider)
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.nodes_created, 1);
    assert_eq!(outcome.report.summaries_set, 1);
    assert_eq!(outcome.report.embedding_failures, 1);

    let node = store.get_node("Kings").await.unwrap().unwrap();
    assert_eq!(node.summary(), Some("Text A"));
    assert!(node.summary_embedding().is_none());
}
