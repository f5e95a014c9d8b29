//! Mock image generation backend for integration tests
//!
//! Serves the Hive v3, Hive v2 task and OpenAI image endpoints with canned
//! responses, or fails every call with a fixed status and body.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// 1x1 transparent PNG
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// A request the mock received
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Mock provider that returns predictable responses
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockProviderState>,
}

struct MockProviderState {
    request_count: AtomicU32,
    last_request: Mutex<Option<ReceivedRequest>>,
    /// When set, every call fails with this status and body
    failure: Option<(StatusCode, String)>,
}

impl MockProvider {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock server that answers every call with `status` and `body`
    pub async fn start_failing(status: u16, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some((StatusCode::from_u16(status)?, body.to_owned()))).await
    }

    async fn start_inner(failure: Option<(StatusCode, String)>) -> anyhow::Result<Self> {
        let state = Arc::new(MockProviderState {
            request_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
            failure,
        });

        let app = Router::new()
            .route("/api/v3/{*model}", routing::post(handle_hive_v3))
            .route("/api/v2/task/sync", routing::post(handle_hive_v2))
            .route("/v1/images/generations", routing::post(handle_openai))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a Hive provider
    pub fn hive_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL for configuring the mock as an OpenAI provider
    ///
    /// Includes `/v1` since the OpenAI provider appends `/images/generations`
    pub fn openai_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<ReceivedRequest> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record(state: &MockProviderState, path: String, headers: &HeaderMap, body: Value) -> Option<Response> {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    *state.last_request.lock().unwrap() = Some(ReceivedRequest {
        path,
        authorization,
        body,
    });

    state
        .failure
        .as_ref()
        .map(|(status, body)| (*status, body.clone()).into_response())
}

async fn handle_hive_v3(
    State(state): State<Arc<MockProviderState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = record(&state, format!("/api/v3/{model}"), &headers, body) {
        return failure;
    }

    Json(json!({
        "id": "mock-task",
        "model": model,
        "output": [{ "url": format!("https://images.mock/{model}.png") }]
    }))
    .into_response()
}

async fn handle_hive_v2(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = record(&state, "/api/v2/task/sync".to_owned(), &headers, body) {
        return failure;
    }

    Json(json!({
        "status": [{
            "response": {
                "output": [{ "url": "https://images.mock/sdxl.png" }]
            }
        }]
    }))
    .into_response()
}

async fn handle_openai(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = record(&state, "/v1/images/generations".to_owned(), &headers, body) {
        return failure;
    }

    Json(json!({
        "created": 1_700_000_000,
        "data": [{ "b64_json": PNG_BASE64 }]
    }))
    .into_response()
}
