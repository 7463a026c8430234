#![allow(clippy::unwrap_used)]
// Integration tests for `EapiClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eosman_api::{EapiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EapiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = EapiClient::with_client(
        reqwest::Client::new(),
        &base_url,
        "admin",
        SecretString::from("arista".to_string()),
    )
    .unwrap();
    (server, client)
}

// ── Success path ────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_cmds_returns_text_outputs() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({
            "method": "runCmds",
            "params": { "cmds": ["enable", "show version"], "format": "text" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "result": [
                { "output": "" },
                { "output": "Arista DCS-7050SX3-48YC8-F\nSoftware image version: 4.28.3M\n" }
            ]
        })))
        .mount(&server)
        .await;

    let outputs = client.run_cmds(&["enable", "show version"]).await.unwrap();
    assert_eq!(outputs.len(), 2);
    assert!(outputs[1].starts_with("Arista DCS-7050SX3"));
}

// ── Failure paths ───────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_command_maps_to_command_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": {
                "code": 1002,
                "message": "CLI command 2 of 2 'show bogus' failed: invalid command",
                "data": [
                    { "output": "" },
                    { "errors": ["Invalid input (at token 1: 'bogus')"] }
                ]
            }
        })))
        .mount(&server)
        .await;

    let result = client.run_cmds(&["enable", "show bogus"]).await;
    match result {
        Err(Error::Command { code, errors, .. }) => {
            assert_eq!(code, 1002);
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected Command error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.run_cmds(&["show version"]).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_without_body_maps_to_http() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let result = client.run_cmds(&["show version"]).await;
    assert!(
        matches!(result, Err(Error::Http { status: 503 })),
        "expected Http error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_garbage_body_maps_to_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = client.run_cmds(&["show version"]).await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("login")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
