#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use colca_api::config::ServerConfig;
use colca_api::router::build_app_router;
use colca_api::state::AppState;

pub const BFL_KEY: &str = "bfl-test-key";
pub const GEMINI_KEY: &str = "gemini-test-key";

/// Bytes served as the Flux sample (a JPEG SOI marker).
pub const SAMPLE_BYTES: [u8; 3] = [0xff, 0xd8, 0xff];

/// Build a test `ServerConfig` with no upstream credentials.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        ..ServerConfig::default()
    }
}

/// Config pointing every upstream at `upstream`, with valid keys.
pub fn upstream_config(upstream: &Upstream) -> ServerConfig {
    ServerConfig {
        bfl_api_key: Some(BFL_KEY.into()),
        bfl_create_url: format!("{}/flux/create", upstream.base),
        gemini_api_key: Some(GEMINI_KEY.into()),
        gemini_base_url: format!("{}/gemini", upstream.base),
        gemini_image_model: "image-model".into(),
        gemini_caption_model: "caption-model".into(),
        upload_endpoint: Some(format!("{}/store", upstream.base)),
        ..test_config()
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState::new(config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Percent-encode a URL for use as a query value.
pub fn encode(url: &str) -> String {
    url.replace(':', "%3A").replace('/', "%2F").replace('?', "%3F")
}

// ---------------------------------------------------------------------------
// Upstream stand-in: Flux, Gemini and the storage endpoint on one server
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Upstream {
    pub base: String,
    pub polls: Arc<AtomicUsize>,
    pub sample_fetches: Arc<AtomicUsize>,
    pub stores: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn poll_url(&self, kind: &str) -> String {
        format!("{}/flux/poll/{kind}", self.base)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

pub async fn spawn_upstream() -> Upstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let address: SocketAddr = listener.local_addr().expect("upstream addr");
    let upstream = Upstream {
        base: format!("http://{address}"),
        polls: Arc::default(),
        sample_fetches: Arc::default(),
        stores: Arc::default(),
    };

    let app = Router::new()
        .route("/flux/create", post(flux_create))
        .route("/flux/poll/{kind}", axum::routing::get(flux_poll))
        .route("/flux/sample", axum::routing::get(flux_sample))
        .route("/flux/sample-once", axum::routing::get(flux_sample_once))
        .route("/gemini/models/{call}", post(gemini_generate))
        .route("/store", post(store))
        .layer(DefaultBodyLimit::disable())
        .with_state(upstream.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("run upstream");
    });
    upstream
}

fn has_key(headers: &HeaderMap, name: &str, expected: &str) -> bool {
    headers.get(name).and_then(|v| v.to_str().ok()) == Some(expected)
}

async fn flux_create(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_key(&headers, "x-key", BFL_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    if body["prompt"] == "reject" {
        return (StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":"invalid prompt"}"#)
            .into_response();
    }
    if body["seed"].is_string() {
        let detail = json!({"detail": "seed must be an integer", "got": body["seed"]});
        return (StatusCode::UNPROCESSABLE_ENTITY, detail.to_string()).into_response();
    }
    Json(json!({
        "id": format!("job-{}-{}", body["aspect_ratio"].as_str().unwrap_or(""), body["output_format"].as_str().unwrap_or("")),
        "polling_url": upstream.poll_url("ready"),
    }))
    .into_response()
}

async fn flux_poll(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Path(kind): Path<String>,
) -> Response {
    upstream.polls.fetch_add(1, Ordering::SeqCst);
    if !has_key(&headers, "x-key", BFL_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    let sample = format!("{}/flux/sample", upstream.base);
    let body = match kind.as_str() {
        "pending" => json!({"id": "job-1", "status": "Pending", "progress": 0.4}),
        "moderated" => json!({"id": "job-1", "status": "Content Moderated"}),
        "ready" => json!({
            "id": "job-1",
            "status": "Ready",
            "result": {"sample": sample, "width": 1024, "height": 768},
        }),
        "ready-once" => json!({
            "id": "job-1",
            "status": "Ready",
            "result": {"sample": format!("{}/flux/sample-once", upstream.base), "width": 512, "height": 512},
        }),
        "ready-no-sample" => json!({"id": "job-1", "status": "Ready", "result": {}}),
        _ => return (StatusCode::NOT_FOUND, "Task not found").into_response(),
    };
    Json(body).into_response()
}

async fn flux_sample(State(upstream): State<Upstream>) -> Response {
    upstream.sample_fetches.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/jpeg")], SAMPLE_BYTES.to_vec()).into_response()
}

/// Serves the sample once, then behaves like an expired signed URL.
async fn flux_sample_once(State(upstream): State<Upstream>) -> Response {
    if upstream.sample_fetches.fetch_add(1, Ordering::SeqCst) > 0 {
        return (StatusCode::FORBIDDEN, "Request has expired").into_response();
    }
    ([(header::CONTENT_TYPE, "image/jpeg")], SAMPLE_BYTES.to_vec()).into_response()
}

async fn gemini_generate(
    headers: HeaderMap,
    Path(call): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !has_key(&headers, "x-goog-api-key", GEMINI_KEY) {
        return (StatusCode::FORBIDDEN, "API key not valid").into_response();
    }
    let parts = body["contents"][0]["parts"].as_array().cloned().unwrap_or_default();
    let prompt = parts
        .first()
        .and_then(|p| p["text"].as_str())
        .unwrap_or("")
        .to_string();

    match call.as_str() {
        "image-model:generateContent" => {
            if prompt.contains("overloaded") {
                return (StatusCode::SERVICE_UNAVAILABLE, "model overloaded").into_response();
            }
            // Echo how many reference images were received.
            let references = parts.len() - 1;
            Json(json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": format!("IMG{references}")}},
                ]}}]
            }))
            .into_response()
        }
        "caption-model:generateContent" => Json(json!({
            "candidates": [{"content": {"parts": [{"text": "\"Chase The Horizon\""}]}}]
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown model").into_response(),
    }
}

async fn store(State(upstream): State<Upstream>, Json(body): Json<Value>) -> Response {
    let n = upstream.stores.fetch_add(1, Ordering::SeqCst) + 1;
    if body["headline"] == "reject" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "Drive quota exceeded"})),
        )
            .into_response();
    }
    Json(json!({
        "success": true,
        "fileId": format!("f{n}"),
        "viewUrl": format!("https://drive.example/view/f{n}"),
        "directUrl": format!("https://drive.example/uc/f{n}"),
    }))
    .into_response()
}
