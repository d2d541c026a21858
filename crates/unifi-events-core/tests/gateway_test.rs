#![allow(clippy::unwrap_used)]
// Session-guard behaviour of the request gateway, using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi_events_core::{ClientConfig, ConnectionState, CoreError, EventClient, Topic, data_of};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EventClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap();
    let config = ClientConfig::new(url, "admin", SecretString::from("pw".to_owned()));
    (server, EventClient::new(config).unwrap())
}

async fn mount_probe(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/self"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "data": [] })))
        .mount(server)
        .await;
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "meta": { "rc": "ok" }, "data": data })
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_valid_session_sends_without_login() {
    let (server, client) = setup().await;
    mount_probe(&server, 200).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let body = envelope(json!([{ "mac": "aa:bb:cc:dd:ee:ff" }]));
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_clients().await.unwrap();
    assert_eq!(result, body);
    assert_eq!(data_of(&result).len(), 1);
}

#[tokio::test]
async fn test_stale_session_logs_in_then_sends_once() {
    let (server, client) = setup().await;
    mount_probe(&server, 401).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": "pw", "strict": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/stamgr"))
        .and(body_json(json!({ "cmd": "block-sta", "mac": "aa:bb:cc:dd:ee:ff" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    client
        .post(
            "cmd/stamgr",
            &json!({ "cmd": "block-sta", "mac": "aa:bb:cc:dd:ee:ff" }),
        )
        .await
        .unwrap();
    assert!(client.is_session_valid());
}

#[tokio::test]
async fn test_failed_relogin_skips_request_without_lifecycle_noise() {
    let (server, client) = setup().await;
    let mut lifecycle = client.subscribe(Topic::Lifecycle);
    mount_probe(&server, 401).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/s/default/rest/user/abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.delete("rest/user/abc").await;
    assert!(
        matches!(result, Err(CoreError::Reauthentication { .. })),
        "expected Reauthentication, got: {result:?}"
    );

    // Not started: there is no connection to lose.
    assert!(lifecycle.try_recv().is_none());
    assert_eq!(*client.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_privileged_endpoints_skip_site_prefix() {
    let (server, client) = setup().await;
    mount_probe(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{ "name": "default" }]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stat/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();
    assert_eq!(data_of(&sites)[0]["name"], "default");
    client.site_stats().await.unwrap();
}

#[tokio::test]
async fn test_get_client_lowercases_mac() {
    let (server, client) = setup().await;
    mount_probe(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/user/aa:bb:cc:dd:ee:ff"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "mac": "aa:bb:cc:dd:ee:ff" }]))))
        .expect(1)
        .mount(&server)
        .await;

    client.get_client("AA:BB:CC:DD:EE:FF").await.unwrap();
    assert!(client.get_client("  ").await.is_err());
}

#[tokio::test]
async fn test_api_error_keeps_status() {
    let (server, client) = setup().await;
    mount_probe(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    match client.get("stat/device").await {
        Err(CoreError::Api { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
