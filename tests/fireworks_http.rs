//! HTTP-level tests against a mock inference server

use fireworks_chat::{
    messages::{AudioInput, Conversation},
    ConversationAdapter, ErrorKind,
};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for delta in deltas {
        let chunk = json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "created": 1,
            "model": "accounts/fireworks/models/llama-v3p1-405b-instruct",
            "choices": [{"index": 0, "text": delta, "logprobs": null, "finish_reason": null}],
        });
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    // Usage-only chunk with no choices
    body.push_str("data: {\"id\":\"cmpl-1\",\"choices\":[],\"usage\":{\"total_tokens\":9}}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

async fn base_url(server: &MockServer) -> String {
    format!("{}/v1", server.uri())
}

#[tokio::test]
async fn streams_completion_snapshots() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("authorization", "Bearer fw-test"))
        .and(body_partial_json(json!({
            "model": "accounts/fireworks/models/llama-v3p1-405b-instruct",
            "prompt": "User: Hi\nAssistant: Hello!\nUser: Count to three\nAssistant: ",
            "stream": true,
            "max_tokens": 4096,
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["One", ", two", ", three."])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let adapter =
        ConversationAdapter::with_base_url("llama-v3p1-405b-instruct", Some("fw-test"), &base_url(&server).await)
            .unwrap();
    let history = Conversation::from_exchanges([("Hi", "Hello!")]);

    let snapshots: Vec<String> = adapter
        .respond("Count to three", &history)
        .unwrap()
        .map(|s| s.unwrap())
        .collect()
        .await;

    assert_eq!(
        snapshots,
        vec!["One", "One, two", "One, two, three.", "One, two, three."]
    );
}

#[tokio::test]
async fn agent_model_targets_agent_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(json!({"model": "accounts/fireworks/agents/f1-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&["ok"])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ConversationAdapter::with_base_url("f1-mini", Some("fw-test"), &base_url(&server).await).unwrap();
    let items: Vec<_> = adapter
        .respond("hi", &Conversation::new())
        .unwrap()
        .collect()
        .await;
    assert!(items.iter().all(Result::is_ok));
}

#[tokio::test]
async fn http_error_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let adapter =
        ConversationAdapter::with_base_url("llama-v3p1-405b-instruct", Some("bad"), &base_url(&server).await)
            .unwrap();
    let items: Vec<_> = adapter
        .respond("hi", &Conversation::new())
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let err = items[0].as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn transcription_uploads_normalized_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("authorization", "Bearer fw-test"))
        .and(body_string_contains("whisper-v3"))
        .and(body_string_contains("filename=\"memo.wav\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "buy milk"})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ConversationAdapter::with_base_url("whisper-v3", Some("fw-test"), &base_url(&server).await).unwrap();
    let turn = adapter
        .transcribe(Some(AudioInput::new(&b"FORM....AIFF"[..], "memo.aiff")))
        .await
        .unwrap();

    assert_eq!(turn.text(), Some("buy milk"));
}

#[tokio::test]
async fn missing_audio_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = ConversationAdapter::with_base_url("whisper-v3", Some("fw-test"), &base_url(&server).await).unwrap();
    let turn = adapter.transcribe(None).await.unwrap();
    assert_eq!(turn.text(), Some(fireworks_chat::adapter::NO_AUDIO_MESSAGE));
}

#[tokio::test]
async fn alignment_sends_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/alignments"))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "hello world",
            "words": [
                {"word": "hello", "start": 0.0, "end": 0.4},
                {"word": "world", "start": 0.45, "end": 0.9},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ConversationAdapter::with_base_url("whisper-v3", Some("fw-test"), &base_url(&server).await).unwrap();
    let alignment = adapter
        .align(Some(AudioInput::new(&b"RIFF"[..], "clip.wav")), "hello world")
        .await
        .unwrap();

    assert_eq!(alignment.words.len(), 2);
    assert_eq!(alignment.words[1].word, "world");
}

#[tokio::test]
async fn malformed_audio_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("could not decode audio"))
        .mount(&server)
        .await;

    let adapter = ConversationAdapter::with_base_url("whisper-v3", Some("fw-test"), &base_url(&server).await).unwrap();
    let err = adapter
        .transcribe(Some(AudioInput::new(&b"garbage"[..], "clip.wav")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
