#![allow(clippy::unwrap_used)]
// Integration tests for the datasource registry endpoints using wiremock.

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kr_api::{Credentials, KismetClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, KismetClient) {
    let server = MockServer::start().await;
    let client = KismetClient::new(
        Url::parse(&server.uri()).unwrap(),
        Credentials::anonymous(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

async fn mount_sources(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/datasource/all_sources.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_interfaces(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/datasource/list_interfaces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn source(name: &str, uuid: &str) -> Value {
    json!({
        "kismet.datasource.name": name,
        "kismet.datasource.uuid": uuid,
        "kismet.datasource.hardware": "rt2800usb",
        "kismet.datasource.interface": name,
        "kismet.datasource.channel": "1"
    })
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sources() {
    let (server, client) = setup().await;
    mount_sources(
        &server,
        json!([source("wlan0", "uuid-0"), source("wlan1", "uuid-1")]),
    )
    .await;

    let sources = client.list_sources().await.unwrap();

    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].name, "wlan0");
    assert_eq!(sources[0].uuid, "uuid-0");
    assert_eq!(sources[1].hardware, "rt2800usb");
    assert_eq!(sources[1].channel, "1");
}

#[tokio::test]
async fn test_list_interfaces() {
    let (server, client) = setup().await;
    mount_interfaces(
        &server,
        json!([{
            "kismet.datasource.probed.interface": "wlx00c0ca",
            "kismet.datasource.probed.hardware": "ath9k_htc",
            "kismet.datasource.probed.in_use_uuid": "00000000-0000-0000-0000-000000000000"
        }]),
    )
    .await;

    let interfaces = client.list_interfaces().await.unwrap();

    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].interface, "wlx00c0ca");
    assert_eq!(interfaces[0].hardware, "ath9k_htc");
}

// ── Lookups ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_has_source_matches_listing() {
    let (server, client) = setup().await;
    mount_sources(&server, json!([source("wlan0", "uuid-0")])).await;

    assert!(client.has_source("wlan0").await);
    assert!(!client.has_source("wlan1").await);
}

#[tokio::test]
async fn test_has_source_false_for_other_listing() {
    let (server, client) = setup().await;
    mount_sources(&server, json!([source("wlan2", "uuid-2")])).await;

    assert!(!client.has_source("wlan0").await);
}

#[tokio::test]
async fn test_has_source_false_for_empty_listing() {
    let (server, client) = setup().await;
    mount_sources(&server, json!([])).await;

    assert!(!client.has_source("wlan0").await);
}

#[tokio::test]
async fn test_has_source_false_on_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/datasource/all_sources.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.has_source("wlan0").await);
}

#[tokio::test]
async fn test_has_interface() {
    let (server, client) = setup().await;
    mount_interfaces(
        &server,
        json!([{"kismet.datasource.probed.interface": "wlan3"}]),
    )
    .await;

    assert!(client.has_interface("wlan3").await);
    assert!(!client.has_interface("wlan0").await);
}
