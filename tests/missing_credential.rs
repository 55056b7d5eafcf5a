//! Construction without any credential
//!
//! Lives in its own test binary because it clears a process-wide environment variable.

use fireworks_chat::{config::API_KEY_ENV, interface, ConversationAdapter, ErrorKind};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    std::env::remove_var(API_KEY_ENV);

    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let base_url = format!("{}/v1", server.uri());

    let err = ConversationAdapter::with_base_url("llama-v3p1-405b-instruct", None, &base_url).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = interface::load_with_base_url("whisper-v3", Some(""), Default::default(), &base_url).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
