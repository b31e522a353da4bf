//! Integration tests for the OpenAI-compatible judgment client.
//!
//! Uses wiremock for HTTP mocking. Covers content extraction, the status
//! → `ProviderError` mapping (401/429/5xx/other), protocol failures,
//! request timeout, and retry behavior end to end through the controller.

use std::time::{Duration, Instant};

use tally_core::{
    AuditConfig, LlmClient, OpenAiClient, ProviderError, RetryController, RetryPolicy,
    TaskResolution,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> AuditConfig {
    AuditConfig::default()
        .with_endpoint(server.uri())
        .with_model("auditor")
        .with_api_key("test-key")
}

fn chat_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn success_returns_message_content() {
    let server = MockServer::start().await;
    let payload = r#"{"is_consistent": true, "justification": "Direct match"}"#;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "auditor",
            "temperature": 0.0,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(payload)))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let raw = client.complete("system", "user").await.expect("complete");
    assert_eq!(raw, payload);
}

#[tokio::test]
async fn missing_key_sends_no_bearer_and_still_works() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("{}")))
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.api_key = None;
    let client = OpenAiClient::new(&config).expect("client");
    assert_eq!(client.complete("s", "u").await.expect("complete"), "{}");
}

#[tokio::test]
async fn unauthorized_maps_to_permanent_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    match client.complete("s", "u").await.unwrap_err() {
        ProviderError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_transient_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(err.is_transient());
    match err {
        ProviderError::Server { status, .. } => assert_eq!(status, Some(503)),
        other => panic!("expected Server, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_status_maps_to_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::Network { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn non_json_body_is_a_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway page</html>"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::Protocol { .. }));
}

#[tokio::test]
async fn missing_content_field_is_a_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": []
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::Protocol { .. }));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.timeout_secs = 1;
    let client = OpenAiClient::new(&config).expect("client");
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout));
    assert!(err.is_transient());
}

#[tokio::test]
async fn controller_retries_5xx_then_succeeds() {
    let server = MockServer::start().await;
    let payload = r#"{"is_consistent": false, "justification": "Mismatch"}"#;

    // First two calls hit the 503 mock, then it stops matching and the
    // success mock takes over.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(payload)))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let controller = RetryController::new(RetryPolicy {
        max_attempts: 3,
        backoff_step: Duration::from_millis(50),
    });

    let start = Instant::now();
    let resolution = controller.run_task(&client, "system", "user").await;
    let elapsed = start.elapsed();

    match resolution {
        TaskResolution::Judged { judgment, attempts } => {
            assert_eq!(judgment.is_consistent, Some(false));
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Judged, got {other:?}"),
    }
    // Backoff sum: step*1 + step*2.
    assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn controller_gives_up_after_the_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let controller = RetryController::new(RetryPolicy {
        max_attempts: 2,
        backoff_step: Duration::from_millis(50),
    });

    let start = Instant::now();
    let resolution = controller.run_task(&client, "system", "user").await;

    match resolution {
        TaskResolution::Abandoned { error, attempts } => {
            assert!(matches!(error, ProviderError::Server { .. }));
            assert_eq!(attempts, 2);
        }
        other => panic!("expected Abandoned, got {other:?}"),
    }
    // One backoff between the two attempts, none after the last.
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn fenced_model_output_parses_through_the_controller() {
    let server = MockServer::start().await;
    let fenced = "```json\n{\"is_consistent\": true, \"justification\": \"ok\"}\n```";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(fenced)))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&test_config(&server)).expect("client");
    let controller = RetryController::new(RetryPolicy {
        max_attempts: 1,
        backoff_step: Duration::from_millis(1),
    });

    match controller.run_task(&client, "system", "user").await {
        TaskResolution::Judged { judgment, .. } => {
            assert_eq!(judgment.is_consistent, Some(true));
            assert_eq!(judgment.justification.as_deref(), Some("ok"));
        }
        other => panic!("expected Judged, got {other:?}"),
    }
}
