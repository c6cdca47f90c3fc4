//! HTTP surface of the gateway.
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness and the configured model
//! - `GET /search?q=&raw=` - web results, summarized unless `raw`
//! - `GET /browse?url=&raw=` - one page, extracted unless `raw`
//! - `GET /ask?q=` - the full search/select/scrape/synthesize pipeline
//! - `POST /api/intel` - compressed facts under a byte budget (`X-Api-Key`)
//! - `GET /api/log` - recent activity (`X-Api-Key`)
//! - `GET /price?coin=` - live USD quote
//! - `GET /hit?url=` - status, headers and timing of a plain GET

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::activity::{ActivityLog, ActivityStatus};
use crate::config::{GatewayConfig, ServerConfig};
use crate::error::{GatewayError, Result};
use crate::pipeline::truncate::clamp_budget;
use crate::pipeline::{AskAnswer, IntelFacts, Pipeline};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "intel-gateway";

/// Fetch engine reported by `/health`.
const ENGINE: &str = "http";

/// Header carrying the intel API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Timeout for `/hit` requests.
const HIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest error message returned by `/api/intel`.
const MAX_ERROR_CHARS: usize = 200;

type Reply = (StatusCode, Json<Value>);

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    activity: Arc<ActivityLog>,
    hit_client: reqwest::Client,
    api_key: Arc<str>,
    model: Arc<str>,
}

impl AppState {
    /// Bundle the pipeline and activity log with the settings handlers need.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Server`] if the `/hit` client cannot be built.
    pub fn new(pipeline: Arc<Pipeline>, activity: Arc<ActivityLog>, config: &GatewayConfig) -> Result<Self> {
        let hit_client = reqwest::Client::builder()
            .timeout(HIT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| GatewayError::Server(format!("failed to build hit client: {e}")))?;
        Ok(Self {
            pipeline,
            activity,
            hit_client,
            api_key: Arc::from(config.auth.api_key.as_str()),
            model: Arc::from(config.llm.model.as_str()),
        })
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|key| !self.api_key.is_empty() && key == &*self.api_key)
    }
}

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/search", get(handle_search))
        .route("/browse", get(handle_browse))
        .route("/ask", get(handle_ask))
        .route("/api/intel", post(handle_intel))
        .route("/api/log", get(handle_log))
        .route("/price", get(handle_price))
        .route("/hit", get(handle_hit))
        .with_state(state)
}

/// The gateway's HTTP server running in a background task.
pub struct GatewayServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl GatewayServer {
    /// Bind `{host}:{port}` (port `0` picks a free port) and start serving.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Server`] if the listener cannot bind.
    pub async fn start(state: AppState, config: &ServerConfig) -> Result<Self> {
        let app = router(state);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| GatewayError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Server(format!("failed to get local addr: {e}")))?;

        info!("intel gateway listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("gateway server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for GatewayServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Seconds since `start`, rounded to `places` decimals.
fn elapsed_since(start: Instant, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (start.elapsed().as_secs_f64() * scale).round() / scale
}

fn short(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

fn internal_error(state: &AppState, action: &str, subject: &str, err: &GatewayError) -> Reply {
    tracing::error!(action, subject, error = %err, "request failed");
    state
        .activity
        .record(action, &format!("{subject}: {err}"), ActivityStatus::Error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "model": &*state.model,
        "engine": ENGINE,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default)]
    raw: bool,
}

/// `GET /search`
async fn handle_search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Reply {
    let start = Instant::now();
    let q = params.q;
    let outcome: Result<Reply> = async {
        let results = state.pipeline.web_results(&q).await?;
        if params.raw || results.is_empty() {
            state
                .activity
                .record("search", &format!("{q} ({} raw)", results.len()), ActivityStatus::Ok);
            return Ok((StatusCode::OK, Json(json!({ "query": q, "results": results }))));
        }

        let summary = state.pipeline.summarize(&q, &results).await?;
        let elapsed = elapsed_since(start, 1);
        state.activity.record(
            "search",
            &format!("{q} ({} results, {elapsed}s)", results.len()),
            ActivityStatus::Ok,
        );
        info!(query = %q, results = results.len(), elapsed, "search summarized");
        Ok((
            StatusCode::OK,
            Json(json!({
                "query": q,
                "summary": summary,
                "result_count": results.len(),
                "elapsed": elapsed,
            })),
        ))
    }
    .await;
    outcome.unwrap_or_else(|e| internal_error(&state, "search", &q, &e))
}

#[derive(Debug, Deserialize)]
struct BrowseParams {
    url: String,
    #[serde(default)]
    raw: bool,
}

/// `GET /browse`
async fn handle_browse(State(state): State<AppState>, Query(params): Query<BrowseParams>) -> Reply {
    let start = Instant::now();
    let url = params.url;
    let outcome: Result<Reply> = async {
        let text = state.pipeline.read_page(&url).await?;
        let length = text.chars().count();
        if params.raw || text.is_empty() {
            state
                .activity
                .record("browse", &format!("{url} ({length} chars, raw)"), ActivityStatus::Ok);
            return Ok((
                StatusCode::OK,
                Json(json!({ "url": url, "content": text, "length": length })),
            ));
        }

        let content = state.pipeline.extract(&url, &text).await?;
        let elapsed = elapsed_since(start, 1);
        state.activity.record(
            "browse",
            &format!("{url} ({length} raw, {elapsed}s)"),
            ActivityStatus::Ok,
        );
        Ok((
            StatusCode::OK,
            Json(json!({
                "url": url,
                "content": content,
                "raw_length": length,
                "elapsed": elapsed,
            })),
        ))
    }
    .await;
    outcome.unwrap_or_else(|e| internal_error(&state, "browse", &url, &e))
}

#[derive(Debug, Deserialize)]
struct AskParams {
    q: String,
}

/// `GET /ask`
async fn handle_ask(State(state): State<AppState>, Query(params): Query<AskParams>) -> Reply {
    let start = Instant::now();
    let q = params.q;
    match state.pipeline.ask(&q).await {
        Ok(AskAnswer::NoResults { answer }) => {
            state
                .activity
                .record("ask", &format!("{q}: no results"), ActivityStatus::Warn);
            (StatusCode::OK, Json(json!({ "answer": answer, "sources": [] })))
        }
        Ok(AskAnswer::Answered { answer, sources }) => {
            let elapsed = elapsed_since(start, 1);
            state.activity.record(
                "ask",
                &format!("{q} ({elapsed}s, {} scraped)", sources.len()),
                ActivityStatus::Ok,
            );
            info!(query = %q, scraped = sources.len(), elapsed, "ask answered");
            (
                StatusCode::OK,
                Json(json!({
                    "answer": answer,
                    "scraped_count": sources.len(),
                    "sources": sources,
                    "elapsed": elapsed,
                })),
            )
        }
        Err(e) => internal_error(&state, "ask", &q, &e),
    }
}

/// Body of `POST /api/intel`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntelRequest {
    query: Option<String>,
    mode: Option<String>,
    url: Option<String>,
    max_bytes: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntelMode {
    Search,
    Browse,
    Price,
}

impl IntelMode {
    /// Unknown or missing modes mean search.
    fn parse(mode: Option<&str>) -> Self {
        match mode.map(str::trim) {
            Some("browse") => Self::Browse,
            Some("price") => Self::Price,
            _ => Self::Search,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Browse => "browse",
            Self::Price => "price",
        }
    }
}

fn intel_reject(status: StatusCode, reason: &str) -> Reply {
    (status, Json(json!({ "ok": false, "e": reason })))
}

fn intel_ok(facts: IntelFacts) -> Reply {
    (
        StatusCode::OK,
        Json(json!({ "ok": true, "f": facts.facts, "s": facts.sources, "t": unix_timestamp() })),
    )
}

/// `POST /api/intel`
async fn handle_intel(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Reply {
    if !state.authorized(&headers) {
        return intel_reject(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let Ok(request) = serde_json::from_slice::<IntelRequest>(&body) else {
        return intel_reject(StatusCode::BAD_REQUEST, "invalid json");
    };

    let start = Instant::now();
    let query = request.query.as_deref().unwrap_or_default().trim().to_owned();
    let mode = IntelMode::parse(request.mode.as_deref());
    let max_bytes = clamp_budget(request.max_bytes);

    if query.is_empty() && mode != IntelMode::Price {
        return intel_reject(StatusCode::BAD_REQUEST, "missing query");
    }

    let outcome = match mode {
        IntelMode::Price => state.pipeline.intel_price(&query, max_bytes).await.map(|(coin, facts)| {
            state
                .activity
                .record("intel", &format!("price:{coin}"), ActivityStatus::Ok);
            intel_ok(facts)
        }),
        IntelMode::Browse => {
            let Some(url) = request.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
                return intel_reject(StatusCode::BAD_REQUEST, "missing url");
            };
            match state.pipeline.intel_browse(url, max_bytes).await {
                Ok(facts) => {
                    let elapsed = elapsed_since(start, 1);
                    state
                        .activity
                        .record("intel", &format!("browse:{url} ({elapsed}s)"), ActivityStatus::Ok);
                    Ok(intel_ok(facts))
                }
                Err(e @ GatewayError::ScrapeFailed(_)) => {
                    state
                        .activity
                        .record("intel", &format!("browse:{url}: {e}"), ActivityStatus::Warn);
                    return intel_reject(StatusCode::OK, &short(&e.to_string()));
                }
                Err(e) => Err(e),
            }
        }
        IntelMode::Search => state.pipeline.intel_search(&query, max_bytes).await.map(|facts| {
            let elapsed = elapsed_since(start, 1);
            state.activity.record(
                "intel",
                &format!("search:{query} ({elapsed}s, {} scraped)", facts.scraped),
                ActivityStatus::Ok,
            );
            info!(query = %query, bytes = facts.facts.len(), elapsed, "intel facts ready");
            intel_ok(facts)
        }),
    };

    outcome.unwrap_or_else(|e| {
        tracing::error!(mode = mode.name(), query = %query, error = %e, "intel request failed");
        state.activity.record(
            "intel",
            &format!("{}:{query}: {e}", mode.name()),
            ActivityStatus::Error,
        );
        intel_reject(StatusCode::INTERNAL_SERVER_ERROR, &short(&e.to_string()))
    })
}

/// `GET /api/log`
async fn handle_log(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })));
    }
    (StatusCode::OK, Json(json!({ "log": state.activity.snapshot() })))
}

#[derive(Debug, Deserialize)]
struct PriceParams {
    #[serde(default = "default_coin")]
    coin: String,
}

fn default_coin() -> String {
    crate::heuristics::DEFAULT_COIN.to_owned()
}

/// `GET /price`
async fn handle_price(State(state): State<AppState>, Query(params): Query<PriceParams>) -> Reply {
    let coin = params.coin;
    match state.pipeline.quote(&coin).await {
        Ok(Some(quote)) => {
            state
                .activity
                .record("price", &format!("{coin}: ${}", quote.price_usd), ActivityStatus::Ok);
            (StatusCode::OK, Json(json!(quote)))
        }
        Ok(None) => {
            state
                .activity
                .record("price", &format!("{coin}: $?"), ActivityStatus::Ok);
            (
                StatusCode::OK,
                Json(json!({ "error": format!("Coin '{coin}' not found") })),
            )
        }
        Err(e) => internal_error(&state, "price", &coin, &e),
    }
}

#[derive(Debug, Deserialize)]
struct HitParams {
    url: String,
}

/// `GET /hit`
async fn handle_hit(State(state): State<AppState>, Query(params): Query<HitParams>) -> Reply {
    let start = Instant::now();
    let url = params.url;

    let fetched = async {
        let response = state.hit_client.get(&url).send().await?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, headers, body.len()))
    }
    .await;

    match fetched {
        Ok((status, headers, body_len)) => {
            let elapsed = elapsed_since(start, 3);
            let content_type = headers.get("content-type").cloned().unwrap_or_default();
            let content_length = headers
                .get("content-length")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(body_len);
            state
                .activity
                .record("hit", &format!("{url} -> {status} ({elapsed}s)"), ActivityStatus::Ok);
            (
                StatusCode::OK,
                Json(json!({
                    "url": url,
                    "status_code": status,
                    "content_type": content_type,
                    "content_length": content_length,
                    "elapsed": elapsed,
                    "headers": headers,
                })),
            )
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "hit failed");
            state
                .activity
                .record("hit", &format!("{url}: {e}"), ActivityStatus::Error);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "url": url, "error": e.to_string() })),
            )
        }
    }
}
