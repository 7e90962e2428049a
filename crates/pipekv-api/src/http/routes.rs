//! HTTP route definitions and handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use pipekv_server::handlers::{BenchError, BulkError, CompareReport};
use pipekv_storage::{KvStore, StorageError};

use super::state::AppState;

/// Default request body size limit (1MB).
/// This prevents memory exhaustion from oversized payloads.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Creates the HTTP router with all endpoints and the default body limit.
pub fn create_router<S: KvStore>(state: AppState<S>) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit<S: KvStore>(state: AppState<S>, body_limit: usize) -> Router {
    let shared_state = Arc::new(state);
    Router::new()
        .route("/api/redis/pipeline/save", post(save_pipelined::<S>))
        .route("/api/redis/normal/save", post(save_sequential::<S>))
        .route("/api/redis/pipeline/get", get(read_pipelined::<S>))
        .route("/api/redis/pipeline/increment", post(increment::<S>))
        .route("/api/redis/pipeline/delete", delete(delete_keys::<S>))
        .route("/api/redis/pipeline/exists", get(check_exists::<S>))
        .route("/api/redis/test/generate", post(generate::<S>))
        .route("/api/redis/test/compare", post(compare::<S>))
        .route("/api/redis/health", get(health_check))
        .route("/ready", get(readiness_check::<S>))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
}

// ============================================================
// Error Handling
// ============================================================

/// Error codes returned in failure responses.
///
/// Each code maps to a specific HTTP status via [`ApiError::into_response`].
pub mod error_codes {
    /// Malformed input, rejected before contacting the store (400).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// The store is unreachable or timed out (503).
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
    /// Unexpected internal error (500).
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error response format.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a store unavailable error (503).
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::STORE_UNAVAILABLE, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            STORE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::ConnectionError { .. } => {
                error!("Store unavailable: {}", err);
                ApiError::store_unavailable("key-value store unavailable")
            }
            _ => {
                error!("Storage error: {}", err);
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

impl From<BulkError> for ApiError {
    fn from(err: BulkError) -> Self {
        match err {
            BulkError::EmptyBatch
            | BulkError::BatchTooLarge { .. }
            | BulkError::InvalidKey { .. } => ApiError::validation_error(err.to_string()),
            BulkError::Storage(storage) => ApiError::from(storage),
        }
    }
}

impl From<BenchError> for ApiError {
    fn from(err: BenchError) -> Self {
        match err {
            BenchError::InvalidCount { .. } => ApiError::validation_error(err.to_string()),
            BenchError::Bulk(bulk) => ApiError::from(bulk),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Health and Readiness Checks
// ============================================================

/// Basic health check - returns 200 if the server is running.
/// Does NOT check the store.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "UP",
        "service": "pipekv"
    }))
}

/// Readiness check - pings the store.
///
/// Returns 200 if the store answers, 503 otherwise. Error details are logged
/// but not exposed in the response.
async fn readiness_check<S: KvStore>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "checks": { "store": "ok" }
            })),
        ),
        Err(e) => {
            error!("Readiness check failed: store unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "checks": { "store": "unavailable" }
                })),
            )
        }
    }
}

// ============================================================
// Bulk Writes
// ============================================================

/// Response for bulk save operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub keys_processed: usize,
    pub message: String,
}

async fn save_pipelined<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    info!(keys = body.len(), "bulk save (pipelined) requested");
    let count = state.bulk.write_pipelined(&body).await?;

    Ok(Json(SaveResponse {
        success: true,
        keys_processed: count,
        message: "Data saved successfully using pipelining".to_string(),
    }))
}

async fn save_sequential<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    info!(keys = body.len(), "bulk save (sequential) requested");
    let count = state.bulk.write_sequential(&body).await?;

    Ok(Json(SaveResponse {
        success: true,
        keys_processed: count,
        message: "Data saved successfully without pipelining".to_string(),
    }))
}

// ============================================================
// Bulk Read / Exists
// ============================================================

/// Query parameter carrying a comma-separated key list,
/// e.g. `?keys=key1,key2,key3`.
#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub keys: String,
}

impl KeysQuery {
    fn into_keys(self) -> Vec<String> {
        self.keys
            .split(',')
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect()
    }
}

/// Response for bulk reads.
#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub success: bool,
    pub count: usize,
    pub data: HashMap<String, String>,
}

async fn read_pipelined<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<KeysQuery>,
) -> ApiResult<impl IntoResponse> {
    let keys = query.into_keys();
    info!(keys = keys.len(), "bulk read requested");
    let data = state.bulk.read_pipelined(&keys).await?;

    Ok(Json(ReadResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// Response for existence checks.
#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub success: bool,
    pub results: HashMap<String, bool>,
}

async fn check_exists<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<KeysQuery>,
) -> ApiResult<impl IntoResponse> {
    let keys = query.into_keys();
    info!(keys = keys.len(), "existence check requested");
    let results = state.bulk.exists_pipelined(&keys).await?;

    Ok(Json(ExistsResponse {
        success: true,
        results,
    }))
}

// ============================================================
// Counters / Deletes
// ============================================================

/// Response for counter increments.
///
/// `values[i]` is the new value of `counters[i]`, or null when that
/// increment reported no value.
#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub success: bool,
    pub counters: Vec<String>,
    pub values: Vec<Option<i64>>,
}

async fn increment<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(counters): Json<Vec<String>>,
) -> ApiResult<impl IntoResponse> {
    info!(counters = counters.len(), "counter increment requested");
    let values = state.bulk.increment_pipelined(&counters).await?;

    Ok(Json(IncrementResponse {
        success: true,
        counters,
        values,
    }))
}

/// Response for bulk deletes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_count: u64,
    pub message: String,
}

async fn delete_keys<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(keys): Json<Vec<String>>,
) -> ApiResult<impl IntoResponse> {
    info!(keys = keys.len(), "bulk delete requested");
    let deleted_count = state.bulk.delete_pipelined(&keys).await?;

    Ok(Json(DeleteResponse {
        success: true,
        deleted_count,
        message: "Keys deleted successfully".to_string(),
    }))
}

// ============================================================
// Benchmark Endpoints
// ============================================================

/// Query parameter for the generate endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    #[serde(default = "default_generate_count")]
    pub count: usize,
}

fn default_generate_count() -> usize {
    10
}

/// Response for sample data generation.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub generated: usize,
    pub message: String,
}

async fn generate<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<impl IntoResponse> {
    info!(count = query.count, "sample data generation requested");
    let generated = state.bench.generate(query.count).await?;

    Ok(Json(GenerateResponse {
        success: true,
        generated,
        message: "Sample data generated successfully".to_string(),
    }))
}

/// Query parameter for the compare endpoint.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(default = "default_compare_count")]
    pub count: usize,
}

fn default_compare_count() -> usize {
    100
}

/// Response for the pipeline-vs-sequential comparison.
///
/// `speedup` is a positive finite number, or null when the pipelined phase
/// measured zero elapsed time and the ratio is not applicable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub success: bool,
    pub operations: usize,
    pub pipeline_time_ms: f64,
    pub normal_time_ms: f64,
    pub speedup: Option<f64>,
    pub message: String,
}

impl From<CompareReport> for CompareResponse {
    fn from(report: CompareReport) -> Self {
        let message = match report.speedup {
            Some(ratio) => format!("Pipelining was {ratio:.2}x faster for bulk operations"),
            None => "Pipelined run was too fast to measure a ratio".to_string(),
        };
        Self {
            success: true,
            operations: report.operations,
            pipeline_time_ms: report.pipeline_time.as_secs_f64() * 1000.0,
            normal_time_ms: report.normal_time.as_secs_f64() * 1000.0,
            speedup: report.speedup,
            message,
        }
    }
}

async fn compare<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<impl IntoResponse> {
    info!(count = query.count, "performance comparison requested");
    let report = state.bench.compare(query.count).await?;

    Ok(Json(CompareResponse::from(report)))
}
