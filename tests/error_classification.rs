//! How failed calls are classified: API errors, undecodable bodies and
//! network failures are distinct, and none of them is retried.

use mockito::Server;
use prompt_tester::{ChatMessage, ClientConfig, Error, PromptClient, ProviderKind, RequestParameters};

fn sonar_client(base_url: &str) -> PromptClient {
    PromptClient::new(
        ClientConfig::new()
            .with_api_key(ProviderKind::Perplexity, "pplx-test")
            .with_base_url(ProviderKind::Perplexity, base_url)
            .unwrap(),
    )
}

fn ping() -> RequestParameters {
    RequestParameters::new("sonar", vec![ChatMessage::user("ping")])
}

#[test]
fn structured_error_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Invalid API key", "type": "authentication_error"}}"#)
        .expect(1)
        .create();

    let err = sonar_client(&server.url()).run(&ping()).unwrap_err();
    mock.assert();
    match &err {
        Error::Api {
            status,
            message,
            error_type,
        } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid API key");
            assert_eq!(error_type.as_deref(), Some("authentication_error"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "API request failed with status 401: Invalid API key (Type: authentication_error)"
    );
}

#[test]
fn server_errors_are_not_retried() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(1)
        .create();

    match sonar_client(&server.url()).run(&ping()) {
        Err(Error::Api {
            status,
            message,
            error_type,
        }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
            assert!(error_type.is_none());
        }
        other => panic!("expected API error, got {:?}", other),
    }
    mock.assert();
}

#[test]
fn undecodable_success_body() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create();

    match sonar_client(&server.url()).run(&ping()) {
        Err(Error::Decode { body, .. }) => assert_eq!(body, "<html>gateway</html>"),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let err = sonar_client("http://127.0.0.1:1").run(&ping()).unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
    assert!(!err.is_config());
}

#[test]
fn invalid_base_url_is_a_configuration_error() {
    let err = ClientConfig::new()
        .with_base_url(ProviderKind::OpenAi, "ftp://example.com")
        .unwrap_err();
    assert!(err.is_config());
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("OPENAI_BASE_URL")
    );
}
