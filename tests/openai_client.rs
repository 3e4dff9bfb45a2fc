use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gpt_client::client::{Client, StreamingClient};
use gpt_client::model::{
    ChatCompletionRequest, ChatCompletionStreamResponse, ChatMessage, CompletionRequest,
    CompletionResponse, EditsRequest, EmbeddingsRequest, FinishReason, ImageRequest, ImageSize,
    SearchRequest, Role,
};
use gpt_client::options::ClientConfig;
use gpt_client::providers::OpenAiClient;
use gpt_client::ClientError;

const KEY: &str = "sk-test";

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(ClientConfig::new(KEY).with_base_url(server.uri())).unwrap()
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests.last().expect("no request received");
    serde_json::from_slice(&request.body).unwrap()
}

fn completion_frame(id: &str, text: &str) -> String {
    json!({
        "id": id,
        "object": "text_completion",
        "created": 1_680_000_000u64,
        "model": "text-davinci-003",
        "choices": [{"text": text, "index": 0, "logprobs": null, "finish_reason": null}]
    })
    .to_string()
}

fn event_stream(lines: &[String]) -> ResponseTemplate {
    let body: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn chat_response() -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_680_000_000u64,
        "model": "gpt-3.5-turbo-0301",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": "Paris."}
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
    })
}

#[tokio::test]
async fn test_chat_completion_sends_headers_and_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response()))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = ChatCompletionRequest::new(vec![ChatMessage::user("Capital of France?")]);
    request.stream = true;
    request.temperature = Some(0.5);

    let response = client_for(&server).chat_completion(request).await.unwrap();

    assert_eq!(response.id, "chatcmpl-1");
    assert_eq!(response.choices[0].message.role, Role::Assistant);
    assert_eq!(response.choices[0].message.content, "Paris.");
    assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.total_tokens, 14);

    let body = last_body(&server).await;
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["stream"], false);
    assert_eq!(body["temperature"], 0.5);
    assert!(body.get("max_tokens").is_none());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("openai-organization").is_none());
}

#[tokio::test]
async fn test_organization_header_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/engines"))
        .and(header("openai-organization", "org-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "ada", "object": "engine", "owner": "openai", "ready": true},
                {"id": "davinci", "object": "engine", "owner": "openai", "ready": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(KEY).with_base_url(server.uri()).with_org("org-42");
    let engines = OpenAiClient::new(config).unwrap().engines().await.unwrap();

    assert_eq!(engines.data.len(), 2);
    assert_eq!(engines.data[0].id, "ada");
    assert!(!engines.data[1].ready);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_engine_lookup_interpolates_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/engines/curie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "curie", "object": "engine", "owner": "openai", "ready": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = client_for(&server).engine("curie").await.unwrap();
    assert_eq!(engine.id, "curie");
    assert!(engine.ready);
}

#[tokio::test]
async fn test_completion_engine_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(completion_frame("cmpl-1", "Hello"), "application/json"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut request = CompletionRequest::new("Say hello");
    request.stream = true;
    let response = client.completion(request).await.unwrap();
    assert_eq!(response.text(), "Hello");

    let body = last_body(&server).await;
    assert_eq!(body["model"], "davinci");
    assert_eq!(body["prompt"], json!(["Say hello"]));
    assert_eq!(body["stream"], false);

    let request = CompletionRequest {
        model: "ada".to_string(),
        ..CompletionRequest::new("Say hello")
    };
    client.completion_with_engine("text-curie-001", request).await.unwrap();
    assert_eq!(last_body(&server).await["model"], "text-curie-001");
}

#[tokio::test]
async fn test_structured_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "invalid_request_error", "message": "The model `nope` does not exist"}
        })))
        .mount(&server)
        .await;

    let request = EditsRequest {
        model: "nope".to_string(),
        instruction: "Fix the spelling".to_string(),
        ..Default::default()
    };
    let err = client_for(&server).edits(request).await.unwrap_err();

    match err {
        ClientError::Api(api) => {
            assert_eq!(api.status_code, 404);
            assert_eq!(api.error_type, "invalid_request_error");
            assert_eq!(api.message, "The model `nope` does not exist");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unstructured_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let request = EmbeddingsRequest {
        input: vec!["hello".to_string()],
        model: "text-embedding-ada-002".to_string(),
        user: None,
    };
    let err = client_for(&server).embeddings(request).await.unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.to_string(), "[503:Unexpected] upstream unavailable");
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let request = ImageRequest {
        prompt: "a lighthouse".to_string(),
        size: Some(ImageSize::Size256x256),
        ..Default::default()
    };
    let err = client_for(&server).image(request).await.unwrap_err();

    match err {
        ClientError::Decode { context, .. } => assert_eq!(context, "invalid json response"),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_paths() {
    let server = MockServer::start().await;
    let results = json!({
        "object": "list",
        "data": [{"document": 1, "object": "search_result", "score": 201.5}]
    });
    Mock::given(method("POST"))
        .and(path("/engines/davinci/search"))
        .and(body_partial_json(json!({"query": "the president"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(results.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/engines/ada/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest {
        documents: vec!["White House".to_string(), "hospital".to_string()],
        query: "the president".to_string(),
    };

    let response = client.search(request.clone()).await.unwrap();
    assert_eq!(response.data[0].document, 1);

    client.search_with_engine("ada", request).await.unwrap();
}

#[tokio::test]
async fn test_completion_stream_delivers_frames_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(body_partial_json(json!({"stream": true, "model": "text-davinci-003"})))
        .respond_with(event_stream(&[
            format!("data: {}", completion_frame("1", "Hel")),
            String::new(),
            ": keep-alive".to_string(),
            format!("data: {}", completion_frame("2", "lo")),
            String::new(),
            "data: [DONE]".to_string(),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = CompletionRequest::new("Say hello");
    request.stream = false;

    let mut frames = Vec::new();
    client_for(&server)
        .completion_stream_with_engine("text-davinci-003", request, &mut |frame: CompletionResponse| {
            frames.push(frame)
        })
        .await
        .unwrap();

    let ids: Vec<&str> = frames.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    let text: String = frames.iter().map(|f| f.text()).collect();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn test_chat_stream_forces_stream_flag() {
    let server = MockServer::start().await;
    let frame = |content: &str| {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_680_000_000u64,
            "model": "gpt-3.5-turbo",
            "choices": [{"index": 0, "finish_reason": null, "delta": {"content": content}}]
        })
        .to_string()
    };
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(event_stream(&[
            format!("data: {}", json!({
                "id": "chatcmpl-1",
                "object": "chat.completion.chunk",
                "created": 1_680_000_000u64,
                "model": "gpt-3.5-turbo",
                "choices": [{"index": 0, "finish_reason": null, "delta": {"role": "assistant"}}]
            })),
            format!("data: {}", frame("Hi")),
            format!("data: {}", frame(" there")),
            "data: [DONE]".to_string(),
        ]))
        .mount(&server)
        .await;

    let mut content = String::new();
    let mut calls = 0;
    client_for(&server)
        .chat_completion_stream(
            ChatCompletionRequest::new(vec![ChatMessage::user("hi")]),
            &mut |frame: ChatCompletionStreamResponse| {
                calls += 1;
                if let Some(text) = &frame.choices[0].delta.content {
                    content.push_str(text);
                }
            },
        )
        .await
        .unwrap();

    assert_eq!(calls, 3);
    assert_eq!(content, "Hi there");

    let body = last_body(&server).await;
    assert_eq!(body["stream"], true);
    assert_eq!(body["model"], "gpt-3.5-turbo");
}

#[tokio::test]
async fn test_stream_without_done_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(event_stream(&[format!("data: {}", completion_frame("1", "partial"))]))
        .mount(&server)
        .await;

    let mut seen = 0;
    let err = client_for(&server)
        .completion_stream(CompletionRequest::new("hi"), &mut |_frame: CompletionResponse| seen += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedEof));
    assert_eq!(seen, 1);
}

#[tokio::test]
async fn test_stream_with_malformed_frame_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(event_stream(&[
            format!("data: {}", completion_frame("1", "ok")),
            "data: {\"id\": ".to_string(),
            format!("data: {}", completion_frame("3", "never")),
            "data: [DONE]".to_string(),
        ]))
        .mount(&server)
        .await;

    let mut ids = Vec::new();
    let err = client_for(&server)
        .completion_stream(CompletionRequest::new("hi"), &mut |frame: CompletionResponse| ids.push(frame.id))
        .await
        .unwrap_err();

    assert_eq!(ids, vec!["1".to_string()]);
    assert!(err.to_string().starts_with("invalid json stream data"));
}

#[tokio::test]
async fn test_stream_error_status_never_calls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"type": "requests", "message": "Rate limit reached"}
        })))
        .mount(&server)
        .await;

    let mut seen = 0;
    let err = client_for(&server)
        .completion_stream(CompletionRequest::new("hi"), &mut |_frame: CompletionResponse| seen += 1)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(429));
    assert_eq!(seen, 0);
}

#[tokio::test]
async fn test_completion_events_pull_based() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(event_stream(&[
            format!("data: {}", completion_frame("1", "a")),
            format!("data: {}", completion_frame("2", "b")),
            "data: [DONE]".to_string(),
        ]))
        .mount(&server)
        .await;

    let mut events = client_for(&server)
        .completion_events(CompletionRequest::new("hi"))
        .await
        .unwrap();

    assert_eq!(events.next().await.unwrap().unwrap().id, "1");
    assert_eq!(events.next().await.unwrap().unwrap().id, "2");
    assert!(events.next().await.is_none());
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/engines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"object": "list", "data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(KEY)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(100));
    let err = OpenAiClient::new(config).unwrap().engines().await.unwrap_err();

    assert!(matches!(err, ClientError::Http(_)));
    assert!(err.is_timeout());
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_custom_http_client_keeps_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/engines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"object": "list", "data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(KEY)
        .with_timeout(Duration::from_millis(100))
        .with_http_client(reqwest::Client::new())
        .with_base_url(server.uri());
    let err = OpenAiClient::new(config).unwrap().engines().await.unwrap_err();

    assert!(err.is_timeout());
}
