//! Full round-trips through the HTTP surface: a mock aggregator behind the
//! real router, served on an ephemeral port.

use std::sync::Arc;

use polymath::providers::OpenRouterBackend;
use polymath::server;
use polymath::service::CompletionService;
use polymath::settings::OpenRouterSettings;
use polymath::shaping::ResponseShaper;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_response(content: &str, finish_reason: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": finish_reason
        }]
    })
}

/// Serve the node against the given mock aggregator and return its base URL.
async fn spawn_node(mock: &MockServer) -> String {
    let backend = OpenRouterBackend::new(
        OpenRouterSettings::new("sk-or-test").with_model("anthropic/claude-3.5-sonnet"),
    )
    .expect("routable model")
    .with_base_url(mock.uri());
    let service = Arc::new(CompletionService::with_shaper(
        Arc::new(backend),
        ResponseShaper::seeded(7),
    ));
    let app = server::router(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{address}")
}

#[tokio::test]
async fn generate_returns_the_answer_on_a_normal_end() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("4", "end_turn")))
        .mount(&mock)
        .await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .post(format!("{node}/method/generate"))
        .json(&serde_json::json!({"prompt": "What is 2+2?"}))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, serde_json::json!({"answer": "4"}));
}

#[tokio::test]
async fn billing_rejection_surfaces_as_a_non_200_status() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
            "error": {"code": 402, "message": "This request requires more credits."}
        })))
        .mount(&mock)
        .await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .post(format!("{node}/method/generate"))
        .json(&serde_json::json!({"prompt": "What is 2+2?"}))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 402);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, serde_json::json!({"error": "Insufficient credits"}));
}

#[tokio::test]
async fn incomplete_generation_yields_500_with_the_stop_reason() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_response("partial", "length")),
        )
        .mount(&mock)
        .await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .post(format!("{node}/method/generate"))
        .json(&serde_json::json!({"prompt": "What is 2+2?"}))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(
        body["error"],
        "Could not generate an answer. Stop reason length"
    );
}

#[tokio::test]
async fn empty_prompt_is_rejected_with_400() {
    let mock = MockServer::start().await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .post(format!("{node}/method/generate"))
        .json(&serde_json::json!({"prompt": "   "}))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn shaped_generation_returns_a_subject_line_and_exact_word_count() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response(
            "The mitochondria is the powerhouse of the cell.",
            "end_turn",
        )))
        .mount(&mock)
        .await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .post(format!("{node}/method/generate"))
        .json(&serde_json::json!({
            "prompt": "Explain the mitochondria.",
            "criteria": {"field": "Biology", "audience": "students"},
            "target_words": 20
        }))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    let answer = body["answer"].as_str().expect("answer text");

    let (subject, rest) = answer.split_once('\n').expect("subject line");
    assert_eq!(subject, "\"The mitochondria is the powerhouse of the cell.\"");
    let words: Vec<&str> = rest.split_whitespace().collect();
    assert_eq!(words.len(), 20);
    // The original sentence survives verbatim as the body prefix.
    assert_eq!(
        words[..8].join(" "),
        "The mitochondria is the powerhouse of the cell."
    );
}

#[tokio::test]
async fn model_endpoint_reports_the_resolved_identifier() {
    let mock = MockServer::start().await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .get(format!("{node}/method/model"))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, serde_json::json!({"model": "anthropic/claude-3.5-sonnet"}));
}

#[tokio::test]
async fn liveness_probe_answers_ok() {
    let mock = MockServer::start().await;
    let node = spawn_node(&mock).await;

    let response = reqwest::Client::new()
        .get(format!("{node}/"))
        .send()
        .await
        .expect("request ok");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}
