//! Submit and poll against a local stand-in for the Flux service.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use colca_core::job::{GenerationJob, JobStatus, OutputFormat, PollOutcome};
use colca_flux::api::{FluxApi, FluxConfig, SubmitRequest};
use colca_flux::cache::ReadyCache;
use colca_flux::error::FluxError;
use colca_flux::poller::{poll_until_settled, PollerConfig};
use colca_flux::relay::{PollRelay, PollSource};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const API_KEY: &str = "test-key";
const SAMPLE_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

#[derive(Clone)]
struct Mock {
    base: Arc<String>,
    sample_expired: Arc<AtomicBool>,
    status_calls: Arc<AtomicUsize>,
    last_create_body: Arc<tokio::sync::Mutex<Option<Value>>>,
}

async fn create(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("x-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    if body["prompt"] == "reject me" {
        return (StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":"bad prompt"}"#).into_response();
    }
    *mock.last_create_body.lock().await = Some(body);
    Json(json!({
        "id": "job-1",
        "polling_url": format!("{}/poll/ready", mock.base),
    }))
    .into_response()
}

async fn poll(State(mock): State<Mock>, Path(kind): Path<String>) -> Response {
    mock.status_calls.fetch_add(1, Ordering::SeqCst);
    let body = match kind.as_str() {
        "pending" => json!({"id": "job-1", "status": "Pending", "progress": 0.3}),
        "moderated" => json!({"id": "job-1", "status": "Content Moderated"}),
        "ready" => json!({
            "id": "job-1",
            "status": "Ready",
            "result": {"sample": format!("{}/sample", mock.base), "width": 1024, "height": 768},
        }),
        "ready-images" => json!({
            "status": "Ready",
            "result": {"images": [{"url": format!("{}/sample", mock.base)}]},
        }),
        "ready-no-sample" => json!({"status": "Ready", "result": {}}),
        _ => return (StatusCode::NOT_FOUND, "Task not found").into_response(),
    };
    Json(body).into_response()
}

async fn sample(State(mock): State<Mock>) -> Response {
    if mock.sample_expired.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, "Signature expired").into_response();
    }
    ([("content-type", "image/jpeg")], SAMPLE_BYTES).into_response()
}

async fn spawn_mock() -> Mock {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock listener");
    let address: SocketAddr = listener.local_addr().expect("mock listener addr");
    let mock = Mock {
        base: Arc::new(format!("http://{address}")),
        sample_expired: Arc::new(AtomicBool::new(false)),
        status_calls: Arc::new(AtomicUsize::new(0)),
        last_create_body: Arc::new(tokio::sync::Mutex::new(None)),
    };
    let app = Router::new()
        .route("/create", post(create))
        .route("/poll/{kind}", get(poll))
        .route("/sample", get(sample))
        .with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("run mock server");
    });
    mock
}

fn api(mock: &Mock, key: Option<&str>) -> FluxApi {
    FluxApi::new(FluxConfig {
        api_key: key.map(str::to_string),
        create_url: format!("{}/create", mock.base),
    })
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_returns_id_and_polling_url() {
    let mock = spawn_mock().await;
    let request = SubmitRequest {
        prompt: Some("a red car".into()),
        aspect_ratio: "16:9".into(),
        input_image: Some("AAAA".into()),
        output_format: "jpeg".into(),
        seed: Some(42.into()),
        ..Default::default()
    };

    let submitted = api(&mock, Some(API_KEY)).submit(&request).await.unwrap();

    assert_eq!(submitted.id, "job-1");
    assert!(submitted.polling_url.ends_with("/poll/ready"));

    let forwarded = mock.last_create_body.lock().await.clone().unwrap();
    assert_eq!(forwarded["aspect_ratio"], "16:9");
    assert_eq!(forwarded["seed"], 42);
    assert!(forwarded.get("input_image_2").is_none());
}

#[tokio::test]
async fn submit_surfaces_upstream_status_and_body() {
    let mock = spawn_mock().await;
    let request = SubmitRequest {
        prompt: Some("reject me".into()),
        ..Default::default()
    };

    let err = api(&mock, Some(API_KEY)).submit(&request).await.unwrap_err();

    assert_matches!(
        err,
        FluxError::Create { status: 422, ref body } if body.contains("bad prompt")
    );
}

#[tokio::test]
async fn submit_with_wrong_key_is_upstream_failure() {
    let mock = spawn_mock().await;
    let err = api(&mock, Some("nope"))
        .submit(&SubmitRequest::default())
        .await
        .unwrap_err();
    assert_matches!(err, FluxError::Create { status: 403, .. });
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_payload_passes_through() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let outcome = relay
        .poll_once(&format!("{}/poll/pending", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PollOutcome::Pending(json!({"id": "job-1", "status": "Pending", "progress": 0.3}))
    );
}

#[tokio::test]
async fn moderated_job_is_failed() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let outcome = relay
        .poll_once(&format!("{}/poll/moderated", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap();

    assert_eq!(outcome.status(), JobStatus::Failed);
}

#[tokio::test]
async fn ready_job_is_materialized_inline() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let outcome = relay
        .poll_once(&format!("{}/poll/ready", mock.base), OutputFormat::Png)
        .await
        .unwrap();

    let ready = match outcome {
        PollOutcome::Ready(ready) => ready,
        other => panic!("expected ready outcome, got {other:?}"),
    };
    assert_eq!(ready.width, Some(1024));
    assert_eq!(ready.height, Some(768));
    assert_eq!(ready.asset.mime_type(), "image/png");
    assert_eq!(ready.asset.data(), SAMPLE_BYTES);
}

#[tokio::test]
async fn ready_falls_back_to_images_list() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let outcome = relay
        .poll_once(&format!("{}/poll/ready-images", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap();

    assert_eq!(outcome.status(), JobStatus::Ready);
}

#[tokio::test]
async fn ready_without_sample_is_semantic_failure() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let err = relay
        .poll_once(&format!("{}/poll/ready-no-sample", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap_err();

    assert_matches!(err, FluxError::NoSampleUrl { ref info } if info["status"] == "Ready");
}

#[tokio::test]
async fn unknown_handle_is_poll_failure() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));

    let err = relay
        .poll_once(&format!("{}/poll/missing", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap_err();

    assert_matches!(err, FluxError::Poll { status: 404, ref body } if body == "Task not found");
}

#[tokio::test]
async fn expired_sample_without_cache_fails_on_second_poll() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, Some(API_KEY)));
    let handle = format!("{}/poll/ready", mock.base);

    relay.poll_once(&handle, OutputFormat::Jpeg).await.unwrap();
    mock.sample_expired.store(true, Ordering::SeqCst);
    let err = relay.poll_once(&handle, OutputFormat::Jpeg).await.unwrap_err();

    assert_matches!(err, FluxError::FetchSample { status: 403, .. });
}

#[tokio::test]
async fn expired_sample_with_cache_still_succeeds() {
    let mock = spawn_mock().await;
    let relay = PollRelay::with_cache(api(&mock, Some(API_KEY)), Arc::new(ReadyCache::new(8)));
    let handle = format!("{}/poll/ready", mock.base);

    relay.poll_once(&handle, OutputFormat::Jpeg).await.unwrap();
    mock.sample_expired.store(true, Ordering::SeqCst);
    let second = relay.poll_once(&handle, OutputFormat::Jpeg).await.unwrap();

    assert_eq!(second.status(), JobStatus::Ready);
    assert_eq!(mock.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cached_result_follows_requested_output_format() {
    let mock = spawn_mock().await;
    let relay = PollRelay::with_cache(api(&mock, Some(API_KEY)), Arc::new(ReadyCache::new(8)));
    let handle = format!("{}/poll/ready", mock.base);

    let first = relay.poll_once(&handle, OutputFormat::Jpeg).await.unwrap();
    let second = relay.poll_once(&handle, OutputFormat::Png).await.unwrap();

    assert!(first.to_json()["dataUrl"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    assert!(second.to_json()["dataUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(mock.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_key_never_reaches_upstream() {
    let mock = spawn_mock().await;
    let relay = PollRelay::new(api(&mock, None));

    let err = relay
        .poll_once(&format!("{}/poll/ready", mock.base), OutputFormat::Jpeg)
        .await
        .unwrap_err();

    assert_matches!(err, FluxError::MissingApiKey);
    assert_eq!(mock.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_then_poll_to_completion() {
    let mock = spawn_mock().await;
    let api = api(&mock, Some(API_KEY));
    let submitted = api
        .submit(&SubmitRequest {
            prompt: Some("a blue car".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let relay = PollRelay::new(api);
    let mut job = GenerationJob::new(submitted.id, submitted.polling_url);
    let config = PollerConfig {
        interval: std::time::Duration::from_millis(1),
        max_attempts: 3,
        ..Default::default()
    };

    let status = poll_until_settled(&relay, &mut job, &config).await.unwrap();

    assert_eq!(status, JobStatus::Ready);
    assert_eq!(job.dimensions(), (Some(1024), Some(768)));
}
