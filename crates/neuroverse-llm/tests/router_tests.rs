//! Fallback behaviour against scripted HTTP providers

use futures::StreamExt;
use neuroverse_domain::Message;
use neuroverse_llm::{
    is_rate_limit, CompletionRequest, LlmError, ProviderDescriptor, ProviderKind, ProviderRouter,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(frames: &[&str]) -> String {
    frames.iter().map(|f| format!("data: {}\n\n", f)).collect()
}

fn delta(text: &str) -> String {
    serde_json::json!({ "choices": [{ "delta": { "content": text } }] }).to_string()
}

fn sse(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn provider_at(server: &MockServer, kind: ProviderKind, route: &str) -> ProviderDescriptor {
    ProviderDescriptor::new(kind, Some("test-key".into()))
        .with_endpoint(format!("{}{}", server.uri(), route))
}

fn request() -> CompletionRequest {
    CompletionRequest::new(vec![Message::user("hello")], "Be brief.")
}

async fn collect_live(router: &ProviderRouter) -> (String, Option<LlmError>) {
    let mut stream = router.stream_completion(&request()).await.unwrap();
    let mut text = String::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => text.push_str(&fragment),
            Err(e) => return (text, Some(e)),
        }
    }
    (text, None)
}

#[tokio::test]
async fn test_rate_limited_provider_falls_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&server)
        .await;

    let b = sse_body(&[&delta("Hello"), &delta(" from B"), "[DONE]"]);
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, b))
        .expect(1)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "Hello from B");
}

#[tokio::test]
async fn test_live_stream_falls_through_before_first_fragment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("B"), "[DONE]"])))
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Gemini, "/b"),
    ])
    .unwrap();

    let (text, error) = collect_live(&router).await;
    assert_eq!(text, "B");
    assert!(error.is_none());
}

#[tokio::test]
async fn test_server_error_does_not_fall_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("B"), "[DONE]"])))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    match router.complete(&request()).await {
        Err(LlmError::UpstreamRejected {
            provider,
            status,
            body,
        }) => {
            assert_eq!(provider, "groq");
            assert_eq!(status, 500);
            assert_eq!(body, "internal failure");
        }
        other => panic!("expected UpstreamRejected, got {:?}", other),
    }
}

/// An endpoint with nothing listening; the route carries "429" so a
/// classifier that searched the URL would wrongly fall through.
fn refused_provider() -> ProviderDescriptor {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    ProviderDescriptor::new(ProviderKind::Groq, Some("test-key".into()))
        .with_endpoint(format!("http://{}/v1/429/chat/completions", addr))
}

#[tokio::test]
async fn test_refused_connection_does_not_fall_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("B"), "[DONE]"])))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        refused_provider(),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    match router.complete(&request()).await {
        Err(err @ LlmError::Transport { .. }) => {
            assert_eq!(err.provider(), Some("groq"));
            assert!(!is_rate_limit(&err));
        }
        other => panic!("expected Transport, got {:?}", other),
    }

    match router.stream_completion(&request()).await {
        Err(LlmError::Transport { provider, .. }) => assert_eq!(provider, "groq"),
        Err(other) => panic!("expected Transport, got {:?}", other),
        Ok(_) => panic!("expected Transport, got a stream"),
    }
}

#[tokio::test]
async fn test_quota_phrase_in_body_counts_as_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(403).set_body_string("You exceeded your current quota"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("ok"), "[DONE]"])))
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Gemini, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_all_rate_limited_is_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(429).set_body_string("first"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(429).set_body_string("second"))
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::OpenRouter, "/b"),
    ])
    .unwrap();

    match router.complete(&request()).await {
        Err(LlmError::AllProvidersExhausted { last }) => {
            assert_eq!(last.provider(), Some("openrouter"));
            assert!(last.to_string().contains("second"));
            assert!(is_rate_limit(&last));
        }
        other => panic!("expected AllProvidersExhausted, got {:?}", other),
    }

    assert!(matches!(
        router.stream_completion(&request()).await,
        Err(LlmError::AllProvidersExhausted { .. })
    ));
}

#[tokio::test]
async fn test_unavailable_providers_are_never_called() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(sse(200, sse_body(&[&delta("x"), "[DONE]"])))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        ProviderDescriptor::new(ProviderKind::Groq, None)
            .with_endpoint(format!("{}/a", server.uri())),
        ProviderDescriptor::new(ProviderKind::Mistral, Some(String::new()))
            .with_endpoint(format!("{}/b", server.uri())),
    ])
    .unwrap();

    assert!(matches!(
        router.complete(&request()).await,
        Err(LlmError::NoProviderConfigured)
    ));
}

#[tokio::test]
async fn test_mid_stream_rate_limit_buffered_discards_partial_output() {
    let server = MockServer::start().await;

    let error = r#"{"error":{"message":"Rate limit exceeded","code":429}}"#;
    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(sse(200, sse_body(&[&delta("partial "), error])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("complete"), "[DONE]"])))
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "complete");
}

#[tokio::test]
async fn test_mid_stream_error_live_stays_committed() {
    let server = MockServer::start().await;

    let error = r#"{"error":{"message":"Rate limit exceeded","code":429}}"#;
    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(sse(200, sse_body(&[&delta("partial "), error])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("complete"), "[DONE]"])))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    let (text, error) = collect_live(&router).await;
    assert_eq!(text, "partial ");
    match error {
        Some(LlmError::Stream { provider, message }) => {
            assert_eq!(provider, "groq");
            assert!(message.contains("Rate limit exceeded"));
        }
        other => panic!("expected Stream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_keep_alives_and_garbage_are_skipped() {
    let server = MockServer::start().await;

    let body = format!(
        ": keep-alive\n\ndata: not json at all\n\ndata: {}\n\ndata: {}\n\ndata: {}\n\ndata: [DONE]\n\ndata: {}\n\n",
        delta("Hel"),
        r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
        delta("lo"),
        delta("after done"),
    );
    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(sse(200, body))
        .mount(&server)
        .await;

    let router =
        ProviderRouter::new(vec![provider_at(&server, ProviderKind::Groq, "/a")]).unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "Hello");
}

#[tokio::test]
async fn test_empty_stream_is_a_successful_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(sse(200, sse_body(&["[DONE]"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(sse(200, sse_body(&[&delta("B"), "[DONE]"])))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Groq, "/a"),
        provider_at(&server, ProviderKind::Mistral, "/b"),
    ])
    .unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "");
    let (text, error) = collect_live(&router).await;
    assert_eq!(text, "");
    assert!(error.is_none());
}

#[tokio::test]
async fn test_openrouter_sends_attribution_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/or"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("HTTP-Referer", "https://nikki-hub.vercel.app"))
        .and(header("X-Title", "NeuroVerse"))
        .respond_with(sse(200, sse_body(&[&delta("hi"), "[DONE]"])))
        .expect(1)
        .mount(&server)
        .await;

    let router =
        ProviderRouter::new(vec![provider_at(&server, ProviderKind::OpenRouter, "/or")]).unwrap();

    assert_eq!(router.complete(&request()).await.unwrap(), "hi");
}

#[tokio::test]
async fn test_request_body_carries_system_and_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(sse(200, sse_body(&[&delta("ok"), "[DONE]"])))
        .mount(&server)
        .await;

    let router = ProviderRouter::new(vec![
        provider_at(&server, ProviderKind::Mistral, "/a").with_model("mistral-tiny")
    ])
    .unwrap();
    router.complete(&request()).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["model"], "mistral-tiny");
    assert_eq!(body["stream"], true);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "Be brief.");
    assert_eq!(body["messages"][1]["content"], "hello");
}
