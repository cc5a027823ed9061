#![allow(clippy::unwrap_used)]
// Integration tests for the device signal poller using wiremock.

use std::ops::ControlFlow;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kr_api::{Credentials, KismetClient, TransportConfig};
use kr_core::{CoreError, Poller, Probe, Sample, require_session};

const MAC: &str = "AA:BB:CC:DD:EE:FF";
const FAST: Duration = Duration::from_millis(10);

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

async fn mount_session(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/session/check_session"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_device(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/devices/by-mac/{MAC}/devices.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ── Session gate ────────────────────────────────────────────────────

#[tokio::test]
async fn test_require_session_accepts_200() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;

    require_session(&client).await.unwrap();
}

#[tokio::test]
async fn test_require_session_rejects_401() {
    let (server, client) = setup().await;
    mount_session(&server, 401).await;

    let result = require_session(&client).await;
    assert!(
        matches!(result, Err(CoreError::InvalidLogin)),
        "expected InvalidLogin, got: {result:?}"
    );
}

// ── Poll loop ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_samples_until_sink_breaks() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;
    mount_device(
        &server,
        json!([{ "kismet.common.signal.last_signal": -52 }]),
    )
    .await;

    let cancel = CancellationToken::new();
    let mut seen = Vec::new();
    let summary = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |sample, _| {
            seen.push(sample.clone());
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .unwrap();

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.session_failures, 0);
    assert_eq!(seen, vec![Sample::LastSignal(-52); 3]);
}

#[tokio::test]
async fn test_history_sample_replaces_empty_slots() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;
    mount_device(
        &server,
        json!([{ "kismet.common.rrd.minute_vec": [0, -45, 0, -60] }]),
    )
    .await;

    let cancel = CancellationToken::new();
    let mut seen = None;
    Poller::new(&client, MAC, Probe::MinuteHistory)
        .with_cadence(FAST)
        .run(&cancel, |sample, _| {
            seen = Some(sample.clone());
            ControlFlow::Break(())
        })
        .await
        .unwrap();

    assert_eq!(seen, Some(Sample::History(vec![-100, -45, -100, -60])));
}

#[tokio::test]
async fn test_cancelled_before_start_sends_nothing() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |_, _| ControlFlow::Continue(()))
        .await
        .unwrap();

    assert_eq!(summary.samples, 0);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_cancel_observed_between_iterations() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;
    mount_device(
        &server,
        json!([{ "kismet.common.signal.last_signal": -70 }]),
    )
    .await;

    let cancel = CancellationToken::new();
    let summary = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |_, _| {
            cancel.cancel();
            ControlFlow::Continue(())
        })
        .await
        .unwrap();

    // The in-flight iteration completes; the next one never starts.
    assert_eq!(summary.samples, 1);
}

#[tokio::test]
async fn test_session_failure_is_counted_not_fatal() {
    let (server, client) = setup().await;
    mount_session(&server, 401).await;
    mount_device(
        &server,
        json!([{ "kismet.common.signal.last_signal": -61 }]),
    )
    .await;

    let cancel = CancellationToken::new();
    let mut seen = Vec::new();
    let summary = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |_, counts| {
            seen.push(counts.session_failures);
            if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .unwrap();

    // The sink sees the running count on every sample.
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(summary.samples, 2);
    assert_eq!(summary.session_failures, 2);
}

#[tokio::test]
async fn test_fetch_error_ends_loop() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;
    Mock::given(method("POST"))
        .and(path(format!("/devices/by-mac/{MAC}/devices.json")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let result = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |_, _| ControlFlow::Continue(()))
        .await;

    match result {
        Err(CoreError::Api(kr_api::Error::CommandFailed { status, .. })) => {
            assert_eq!(status, 404);
        }
        other => panic!("expected CommandFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_device_shape_is_error() {
    let (server, client) = setup().await;
    mount_session(&server, 200).await;
    mount_device(&server, json!([])).await;

    let cancel = CancellationToken::new();
    let result = Poller::new(&client, MAC, Probe::LastSignal)
        .with_cadence(FAST)
        .run(&cancel, |_, _| ControlFlow::Continue(()))
        .await;

    assert!(
        matches!(
            result,
            Err(CoreError::Api(kr_api::Error::UnexpectedShape { .. }))
        ),
        "expected UnexpectedShape, got: {result:?}"
    );
}
