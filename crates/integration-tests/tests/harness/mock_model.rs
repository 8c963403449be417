//! Mock model sidecar for integration tests
//!
//! Serves `/load` and `/generate` the way the inference sidecar does,
//! returning a fixed waveform as WAV

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tts::wav::{self, Waveform};

pub const SAMPLE_RATE: u32 = 24_000;

/// Samples every successful generate call returns
pub fn fixed_samples() -> Vec<f32> {
    vec![0.0, 0.25, -0.25, 0.5, -0.5, 0.125]
}

/// Mock model backend that returns predictable audio
pub struct MockModel {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockModelState>,
}

struct MockModelState {
    load_count: AtomicU32,
    generate_count: AtomicU32,
    /// Number of load requests to fail before succeeding
    load_failures: AtomicU32,
    fail_generate: bool,
    last_generate: Mutex<Option<Value>>,
}

impl MockModel {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, false).await
    }

    /// Start a mock server that fails the first `n` load requests with 500
    pub async fn start_failing_loads(n: u32) -> anyhow::Result<Self> {
        Self::start_inner(n, false).await
    }

    /// Start a mock server whose generate endpoint always fails
    pub async fn start_failing_generate() -> anyhow::Result<Self> {
        Self::start_inner(0, true).await
    }

    async fn start_inner(load_failures: u32, fail_generate: bool) -> anyhow::Result<Self> {
        let state = Arc::new(MockModelState {
            load_count: AtomicU32::new(0),
            generate_count: AtomicU32::new(0),
            load_failures: AtomicU32::new(load_failures),
            fail_generate,
            last_generate: Mutex::new(None),
        });

        let app = Router::new()
            .route("/load", routing::post(handle_load))
            .route("/generate", routing::post(handle_generate))
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

    /// Base URL for configuring the worker's model backend
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Total load requests received, including failed ones
    pub fn load_count(&self) -> u32 {
        self.state.load_count.load(Ordering::SeqCst)
    }

    /// Total generate requests received
    pub fn generate_count(&self) -> u32 {
        self.state.generate_count.load(Ordering::SeqCst)
    }

    /// Body of the most recent generate request
    pub fn last_generate(&self) -> Option<Value> {
        self.state.last_generate.lock().unwrap().clone()
    }
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_load(State(state): State<Arc<MockModelState>>, Json(_body): Json<Value>) -> Response {
    state.load_count.fetch_add(1, Ordering::SeqCst);

    let failing = state
        .load_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "checkpoint not found").into_response();
    }

    Json(json!({ "sample_rate": SAMPLE_RATE })).into_response()
}

async fn handle_generate(State(state): State<Arc<MockModelState>>, Json(body): Json<Value>) -> Response {
    state.generate_count.fetch_add(1, Ordering::SeqCst);
    *state.last_generate.lock().unwrap() = Some(body);

    if state.fail_generate {
        return (StatusCode::INTERNAL_SERVER_ERROR, "CUDA out of memory").into_response();
    }

    let bytes = wav::encode(&Waveform::new(fixed_samples(), SAMPLE_RATE)).unwrap();

    ([(axum::http::header::CONTENT_TYPE, "audio/wav")], bytes).into_response()
}
