use std::time::Duration;

use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkscope_client::{ApiError, ClientSettings, DiagnosticsApi, HttpApi, StartError, VendorSubmitError};
use linkscope_core::{Phase, StartRequest, VendorCredentials};

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings::with_base(Url::parse(&server.uri()).expect("server url"))
}

fn api_for(server: &MockServer) -> HttpApi {
    HttpApi::new(&settings_for(server)).expect("client")
}

#[tokio::test]
async fn start_posts_the_request_and_accepts_202() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .and(body_json(serde_json::json!({"target": "1.1.1.1", "scan": true})))
        .respond_with(ResponseTemplate::new(202).set_body_raw(
            r#"{"status":"started"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let outcome = api
        .start(&StartRequest {
            target: "1.1.1.1".to_string(),
            scan: true,
        })
        .await;

    assert!(outcome.is_ok());
}

#[tokio::test]
async fn start_conflict_carries_the_agents_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(409).set_body_string("run already in progress\n"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let outcome = api
        .start(&StartRequest {
            target: String::new(),
            scan: false,
        })
        .await;

    match outcome {
        Err(StartError::Conflict(reason)) => assert_eq!(reason, "run already in progress"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn start_refusals_keep_the_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let outcome = api
        .start(&StartRequest {
            target: String::new(),
            scan: false,
        })
        .await;

    assert!(matches!(outcome, Err(StartError::Rejected(500))));
}

#[tokio::test]
async fn status_decodes_the_live_projection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"phase":"dns","percent":52,"message":"Resolving names"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let status = api_for(&server).status().await.expect("status");

    assert_eq!(status.phase, Phase::Dns);
    assert_eq!(status.percent, 52.0);
    assert_eq!(status.message, "Resolving names");
}

#[tokio::test]
async fn results_decode_the_persisted_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"history_id":"20260812-090000","classification":"healthy","has_gateway":true,"gw_ping":{"avg_ms":1.2,"p95_ms":2.0,"jitter_ms":0.3,"loss":0}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let result = api_for(&server)
        .results()
        .await
        .expect("results")
        .expect("a completed run");

    assert_eq!(result.history_id.as_deref(), Some("20260812-090000"));
    assert_eq!(result.classification, "healthy");
    assert!(result.has_gateway);
    assert_eq!(result.gw_ping.expect("gateway ping").avg_ms, 1.2);
}

#[tokio::test]
async fn results_204_means_no_completed_run_yet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = api_for(&server).results().await.expect("results");

    assert!(result.is_none());
}

#[tokio::test]
async fn history_decodes_the_index_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"id":"20260812-090000","target":"1.1.1.1","classification":"healthy"},{"id":"20260811-170000","target":"","classification":"degraded"}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let entries = api_for(&server).history().await.expect("history");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "20260812-090000");
    assert_eq!(entries[1].classification, "degraded");
}

#[tokio::test]
async fn pruned_run_detail_surfaces_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/run/20260801-000000"))
        .respond_with(ResponseTemplate::new(404).set_body_string("run not found\n"))
        .mount(&server)
        .await;

    let outcome = api_for(&server).run_detail("20260801-000000").await;

    assert!(matches!(outcome, Err(ApiError::HttpStatus(404))));
}

#[tokio::test]
async fn vendor_submission_is_accepted_with_202() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vendor"))
        .and(body_json(serde_json::json!({
            "forti_host": "10.0.0.1",
            "forti_user": "audit",
            "forti_pass": "s3cret"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_raw(
            r#"{"status":"vendor-running"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let creds = VendorCredentials {
        forti_host: "10.0.0.1".to_string(),
        forti_user: "audit".to_string(),
        forti_pass: "s3cret".to_string(),
        ..VendorCredentials::default()
    };
    let outcome = api_for(&server).submit_vendor(&creds).await;

    assert!(outcome.is_ok());
}

#[tokio::test]
async fn vendor_refusal_carries_the_agents_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vendor"))
        .respond_with(ResponseTemplate::new(400).set_body_string("no completed run available\n"))
        .mount(&server)
        .await;

    let outcome = api_for(&server)
        .submit_vendor(&VendorCredentials::default())
        .await;

    match outcome {
        Err(VendorSubmitError::Rejected(reason)) => {
            assert_eq!(reason, "no completed run available")
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn bundle_returns_bytes_and_the_hinted_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bundle"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    r#"attachment; filename="vne-evidence-20260812-0900.zip""#,
                )
                .set_body_bytes(b"PK\x03\x04bundle".to_vec()),
        )
        .mount(&server)
        .await;

    let payload = api_for(&server)
        .bundle()
        .await
        .expect("bundle")
        .expect("a bundle body");

    assert_eq!(
        payload.filename.as_deref(),
        Some("vne-evidence-20260812-0900.zip")
    );
    assert_eq!(payload.bytes, b"PK\x03\x04bundle");
}

#[tokio::test]
async fn bundle_204_means_nothing_to_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bundle"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let payload = api_for(&server).bundle().await.expect("bundle");

    assert!(payload.is_none());
}

#[tokio::test]
async fn slow_endpoints_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"phase":"idle","percent":0,"message":"Ready"}"#, "application/json")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.request_timeout = Duration::from_millis(50);
    let api = HttpApi::new(&settings).expect("client");

    let outcome = api.status().await;

    assert!(matches!(outcome, Err(ApiError::Timeout)));
}
