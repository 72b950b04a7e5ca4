//! Wire-level tests for the Anthropic backend: request shape, header set,
//! text-block concatenation, and the completion-state validation matrix.

use polymath::providers::{AnthropicBackend, CompletionBackend};
use polymath::settings::AnthropicSettings;
use polymath::CompletionError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn messages_response(
    stop_reason: &str,
    stop_sequence: Option<&str>,
    blocks: &[&str],
) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_test",
        "model": "claude-3-5-sonnet-20240620",
        "content": blocks
            .iter()
            .map(|text| serde_json::json!({"type": "text", "text": text}))
            .collect::<Vec<_>>(),
        "stop_reason": stop_reason,
        "stop_sequence": stop_sequence,
        "usage": {"input_tokens": 10, "output_tokens": 5}
    })
}

fn backend(server: &MockServer) -> AnthropicBackend {
    AnthropicBackend::new(AnthropicSettings::new("test-key"))
        .expect("valid settings")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn request_shape_headers_and_block_concatenation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(|req: &Request| {
            let Ok(v) = serde_json::from_slice::<serde_json::Value>(&req.body) else {
                return false;
            };
            if v.get("model") != Some(&serde_json::Value::String("claude-3-5-sonnet-20240620".into())) {
                return false;
            }
            if v.get("max_tokens") != Some(&serde_json::Value::Number(3000u32.into())) {
                return false;
            }
            let Some(system) = v.get("system").and_then(|s| s.as_str()) else {
                return false;
            };
            // Default context prompt: persona plus the 0.75-budget line.
            if !system.starts_with("You are a supreme polymath") {
                return false;
            }
            if !system.ends_with("Keep your answer below 2250 tokens") {
                return false;
            }
            v.get("messages")
                .and_then(|m| m.as_array())
                .and_then(|m| m.first())
                .and_then(|m| m.get("role"))
                .and_then(|r| r.as_str())
                == Some("user")
        })
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(messages_response("end_turn", None, &["The answer ", "is 4."])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let answer = backend(&server)
        .complete("What is 2+2?", None)
        .await
        .expect("complete ok");
    assert_eq!(answer, "The answer is 4.");
}

#[tokio::test]
async fn caller_supplied_system_prompt_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(|req: &Request| {
            serde_json::from_slice::<serde_json::Value>(&req.body)
                .ok()
                .and_then(|v| v.get("system").and_then(|s| s.as_str()).map(str::to_string))
                .as_deref()
                == Some("Answer in one word.")
        })
        .respond_with(
            ResponseTemplate::new(200).set_body_json(messages_response("end_turn", None, &["4"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let answer = backend(&server)
        .complete("What is 2+2?", Some("Answer in one word."))
        .await
        .expect("complete ok");
    assert_eq!(answer, "4");
}

#[tokio::test]
async fn every_non_natural_stop_reason_is_an_error() {
    for stop_reason in ["max_tokens", "stop_sequence", "refusal", "tool_use"] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(messages_response(stop_reason, None, &["truncated text"])),
            )
            .mount(&server)
            .await;

        let err = backend(&server)
            .complete("What is 2+2?", None)
            .await
            .expect_err("non-natural stop must fail");
        assert_eq!(
            err.to_string(),
            format!("Could not generate an answer. Stop reason {stop_reason}")
        );
    }
}

#[tokio::test]
async fn stop_sequence_hit_is_rejected_despite_natural_stop_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(messages_response("end_turn", Some("##"), &["partial"])),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .complete("What is 2+2?", None)
        .await
        .expect_err("stop-sequence hit must fail");
    assert!(matches!(err, CompletionError::Incomplete { .. }));
}

#[tokio::test]
async fn backend_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .complete("What is 2+2?", None)
        .await
        .expect_err("error status must fail");
    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded");
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_reported_as_unreachable() {
    // Nothing listens on this port.
    let backend = AnthropicBackend::new(AnthropicSettings::new("test-key"))
        .expect("valid settings")
        .with_base_url("http://127.0.0.1:9");

    let err = backend
        .complete("What is 2+2?", None)
        .await
        .expect_err("refused connection must fail");
    assert!(err.is_transport(), "got {err:?}");
}
