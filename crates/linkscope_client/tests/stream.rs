use std::time::Duration;

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkscope_client::{ClientEvent, ClientHandle, ClientSettings};
use linkscope_core::Phase;

const SSE_BODY: &str = "event: phase\n\
data: {\"name\":\"netinfo\",\"percent\":12,\"message\":\"Collecting network info\"}\n\
\n\
event: step\n\
data: {\"msg\":\"hostname: lab-gw\"}\n\
\n\
event: done\n\
data: {\"status\":\"finished\"}\n\
\n";

fn fast_settings(server: &MockServer) -> ClientSettings {
    let mut settings = ClientSettings::with_base(Url::parse(&server.uri()).expect("server url"));
    settings.stream_backoff_base = Duration::from_millis(30);
    settings.stream_backoff_cap = Duration::from_millis(60);
    settings
}

async fn collect_events(handle: &ClientHandle, count: usize) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while events.len() < count {
            match handle.try_recv() {
                Some(event) => events.push(event),
                None => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    })
    .await
    .expect("events before the deadline");
    events
}

#[tokio::test]
async fn stream_decodes_the_replay_and_reconnects_after_eof() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(fast_settings(&server)).expect("handle");
    handle.connect_stream();

    // First connection replays three events, then the body ends and the
    // worker reconnects.
    let events = collect_events(&handle, 6).await;

    match &events[0] {
        ClientEvent::StreamConnected { reconnect } => assert!(!reconnect),
        other => panic!("expected first connect, got {other:?}"),
    }
    match &events[1] {
        ClientEvent::StreamPhase(update) => {
            assert_eq!(update.name, Phase::NetInfo);
            assert_eq!(update.percent, Some(12.0));
        }
        other => panic!("expected phase event, got {other:?}"),
    }
    match &events[2] {
        ClientEvent::StreamStep(step) => assert_eq!(step.text, "hostname: lab-gw"),
        other => panic!("expected step event, got {other:?}"),
    }
    assert!(matches!(events[3], ClientEvent::StreamDone(_)));
    assert!(matches!(events[4], ClientEvent::StreamDropped));
    match &events[5] {
        ClientEvent::StreamConnected { reconnect } => assert!(reconnect),
        other => panic!("expected reconnect, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_event_names_are_skipped() {
    let server = MockServer::start().await;
    let body = "event: comment\ndata: {\"note\":\"ignored\"}\n\nevent: step\ndata: {\"msg\":\"kept\"}\n\n";
    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(fast_settings(&server)).expect("handle");
    handle.connect_stream();

    let events = collect_events(&handle, 3).await;

    assert!(matches!(
        events[0],
        ClientEvent::StreamConnected { reconnect: false }
    ));
    match &events[1] {
        ClientEvent::StreamStep(step) => assert_eq!(step.text, "kept"),
        other => panic!("expected the step event, got {other:?}"),
    }
    assert!(matches!(events[2], ClientEvent::StreamDropped));
}

#[tokio::test]
async fn commands_round_trip_through_the_worker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"phase":"wan","percent":68,"message":"Measuring WAN latency"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(fast_settings(&server)).expect("handle");
    handle.fetch_status();

    let events = collect_events(&handle, 1).await;

    match &events[0] {
        ClientEvent::StatusFetched(Ok(status)) => {
            assert_eq!(status.phase, Phase::Wan);
            assert_eq!(status.message, "Measuring WAN latency");
        }
        other => panic!("expected a status event, got {other:?}"),
    }
}
