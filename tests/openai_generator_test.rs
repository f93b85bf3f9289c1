//! Tests for the OpenAI chat-completions adapter against a mock server.

use std::time::Duration;

use gpt_cache_gateway::generation::{GenerationError, OpenAiGenerator, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> OpenAiGenerator {
    OpenAiGenerator::with_base_url("sk-test", &server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn returns_trimmed_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "list three colors"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  [\"red\", \"green\", \"blue\"]\n"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = generator(&server)
        .generate("list three colors", "gpt-3.5-turbo")
        .await
        .unwrap();
    assert_eq!(text, "[\"red\", \"green\", \"blue\"]");
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("hi", "gpt-3.5-turbo")
        .await
        .unwrap_err();
    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("hi", "gpt-3.5-turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyCompletion));
}

#[tokio::test]
async fn undecodable_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("hi", "gpt-3.5-turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Decode(_)));
}

#[tokio::test]
async fn slow_provider_hits_the_adapter_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let generator =
        OpenAiGenerator::with_base_url("sk-test", &server.uri(), Duration::from_millis(200))
            .unwrap();
    let err = generator.generate("hi", "gpt-3.5-turbo").await.unwrap_err();
    assert!(matches!(err, GenerationError::Request(_)));
}
