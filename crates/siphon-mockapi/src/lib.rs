//! In-memory mock source and sink services.
//!
//! Implements the wire contract the transfer engine consumes (a paginated
//! source listing and an upsert sink) as plain in-memory stores with
//! scripted failure injection, so retry behavior can be exercised end to end
//! without a real upstream. The failure counters live entirely inside this
//! fixture; the engine only ever sees the HTTP surface.
//!
//! Endpoints:
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /source/items?page&limit` | Paginated listing, `next_page` cursor |
//! | `POST /sink/items` | Upsert by `external_id`, reports created/updated |
//! | `GET /sink/items` | Current sink contents, sorted by `external_id` |
//! | `POST /admin/reset` | Clears the sink, re-arms failure injection |

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use siphon_core::{PageResult, Record, UpsertStatus};

/// Scripted failure injection for the mock services.
#[derive(Debug, Clone)]
pub struct FailureSchedule {
    /// Source page that fails with 500 exactly once, then recovers.
    pub fail_page_once: Option<u32>,
    /// Every Nth sink write call is rate-limited (rejected calls count too).
    /// Zero disables rate limiting.
    pub rate_limit_every: u64,
    /// `Retry-After` hint attached to rate-limited replies, in seconds.
    pub retry_after_secs: u64,
}

impl Default for FailureSchedule {
    fn default() -> Self {
        Self {
            fail_page_once: Some(2),
            rate_limit_every: 5,
            retry_after_secs: 1,
        }
    }
}

/// Configuration for one mock API instance.
#[derive(Debug, Clone)]
pub struct MockApiConfig {
    /// Number of records seeded into the source (`item-1` .. `item-N`).
    pub seed_count: usize,
    pub failures: FailureSchedule,
}

impl Default for MockApiConfig {
    fn default() -> Self {
        Self {
            seed_count: 25,
            failures: FailureSchedule::default(),
        }
    }
}

impl MockApiConfig {
    /// Variant with failure injection disabled: every call succeeds first try.
    pub fn reliable(seed_count: usize) -> Self {
        Self {
            seed_count,
            failures: FailureSchedule {
                fail_page_once: None,
                rate_limit_every: 0,
                retry_after_secs: 1,
            },
        }
    }
}

struct ApiState {
    source: Vec<Record>,
    sink: Mutex<BTreeMap<String, Record>>,
    fail_page_once: Option<u32>,
    page_fault_armed: AtomicBool,
    rate_limit_every: u64,
    retry_after_secs: u64,
    sink_write_calls: AtomicU64,
}

impl ApiState {
    fn new(config: MockApiConfig) -> Self {
        Self {
            source: seed_records(config.seed_count),
            sink: Mutex::new(BTreeMap::new()),
            fail_page_once: config.failures.fail_page_once,
            page_fault_armed: AtomicBool::new(true),
            rate_limit_every: config.failures.rate_limit_every,
            retry_after_secs: config.failures.retry_after_secs,
            sink_write_calls: AtomicU64::new(0),
        }
    }

    /// True exactly once per arming for the configured page.
    fn take_page_fault(&self, page: u32) -> bool {
        self.fail_page_once == Some(page) && self.page_fault_armed.swap(false, Ordering::SeqCst)
    }

    /// True when this write call lands on the rate-limit schedule.
    fn take_rate_limit(&self) -> bool {
        let calls = self.sink_write_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.rate_limit_every > 0 && calls % self.rate_limit_every == 0
    }
}

fn seed_records(count: usize) -> Vec<Record> {
    (1..=count)
        .map(|i| Record {
            external_id: format!("item-{i}"),
            name: format!("Item {i}"),
            value: i as i64,
        })
        .collect()
}

/// Build the mock application for the given configuration.
pub fn router(config: MockApiConfig) -> Router {
    let state = Arc::new(ApiState::new(config));
    Router::new()
        .route("/source/items", get(list_source_items))
        .route("/sink/items", post(upsert_sink_item).get(list_sink_items))
        .route("/admin/reset", post(reset))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> usize {
    10
}

async fn list_source_items(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PageParams>,
) -> Response {
    if state.take_page_fault(params.page) {
        tracing::info!(page = params.page, "injecting transient source failure");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "injected transient failure" })),
        )
            .into_response();
    }

    let page = params.page.max(1) as usize;
    let limit = params.limit.max(1);
    let start = (page - 1).saturating_mul(limit).min(state.source.len());
    let end = (start + limit).min(state.source.len());
    let next_page = if end < state.source.len() {
        Some(page as u32 + 1)
    } else {
        None
    };

    Json(PageResult {
        items: state.source[start..end].to_vec(),
        next_page,
    })
    .into_response()
}

async fn upsert_sink_item(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(record): Json<Record>,
) -> Response {
    if state.take_rate_limit() {
        tracing::info!(external_id = %record.external_id, "injecting rate limit");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, state.retry_after_secs.to_string())],
            Json(json!({ "detail": "injected rate limit" })),
        )
            .into_response();
    }

    if record.external_id.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": "external_id cannot be empty" })),
        )
            .into_response();
    }

    if let Some(token) = headers.get("idempotency-key").and_then(|v| v.to_str().ok()) {
        tracing::debug!(external_id = %record.external_id, token, "upsert token");
    }

    let created = {
        let mut sink = state.sink.lock().expect("sink store poisoned");
        sink.insert(record.external_id.clone(), record).is_none()
    };

    let status = if created {
        UpsertStatus::Created
    } else {
        UpsertStatus::Updated
    };
    Json(json!({ "status": status })).into_response()
}

async fn list_sink_items(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    let items: Vec<Record> = {
        let sink = state.sink.lock().expect("sink store poisoned");
        sink.values().cloned().collect()
    };
    Json(json!({ "count": items.len(), "items": items }))
}

async fn reset(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    state.sink.lock().expect("sink store poisoned").clear();
    state.page_fault_armed.store(true, Ordering::SeqCst);
    state.sink_write_calls.store(0, Ordering::SeqCst);
    Json(json!({ "ok": true }))
}

/// Running mock API bound to an ephemeral local port.
///
/// The server task is aborted when the handle drops.
pub struct MockApiHandle {
    addr: SocketAddr,
    task: tokio::task::JoinHandle<()>,
}

impl MockApiHandle {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockApiHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Bind to an ephemeral local port and serve in the background.
pub async fn spawn(config: MockApiConfig) -> std::io::Result<MockApiHandle> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(config);

    let task = tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app).await {
            tracing::error!(%error, "mock api server exited");
        }
    });

    Ok(MockApiHandle { addr, task })
}

/// Bind to the given address and serve until shutdown.
pub async fn serve(config: MockApiConfig, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "mock api listening");
    axum::serve(listener, router(config)).await
}
