//! REST API endpoint handlers
//!
//! Provides handlers for:
//! - Public diagnosis and reference data (/api/v1/*)
//! - Admin setup, login and history management (/api/v1/admin/*)

use crate::api::auth::SessionToken;
use crate::api::types::*;
use crate::db::sqlite::models::{HistoryRecord, HistoryStats, Industry};
use crate::error::{AppError, Result};
use crate::services::{
    AuthService, DiagnosisOutcome, DiagnosisService, HistoryPage, HistoryService,
    IndustryBenchmarks, IndustryService, LoginResult,
};
use crate::state::{AdminSession, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Json, Path, Query, State,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(e.body_text()))
}

fn path_param<T>(param: std::result::Result<Path<T>, PathRejection>) -> Result<T> {
    param
        .map(|Path(value)| value)
        .map_err(|e| AppError::Validation(e.body_text()))
}

/// Run Argon2-bound work off the async workers
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success_with_data(data)))
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message(
        "Financial diagnosis API is running",
    ))
}

// ============================================================================
// Public API
// ============================================================================

/// GET /api/v1/industries
pub async fn list_industries(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Industry>> {
    ok(IndustryService::list(&state)?)
}

/// GET /api/v1/industries/:code/benchmarks
pub async fn industry_benchmarks(
    State(state): State<Arc<AppState>>,
    code: std::result::Result<Path<String>, PathRejection>,
) -> ApiResult<IndustryBenchmarks> {
    let code = path_param(code)?;
    ok(IndustryService::benchmarks(&state, &code)?)
}

/// POST /api/v1/diagnosis
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DiagnosisRequest>, JsonRejection>,
) -> ApiResult<DiagnosisOutcome> {
    let input = json_body(payload)?.into_input()?;
    ok(DiagnosisService::diagnose(&state, input)?)
}

// ============================================================================
// Admin: Auth
// ============================================================================

/// POST /api/v1/admin/setup
pub async fn admin_setup(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Empty> {
    let body = json_body(payload)?;
    blocking(move || AuthService::setup(&state, &body.username, &body.password)).await?;
    Ok(Json(ApiResponse::success_with_message("Admin account created")))
}

/// POST /api/v1/admin/login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<LoginResult> {
    let body = json_body(payload)?;
    ok(blocking(move || AuthService::login(&state, &body.username, &body.password)).await?)
}

/// POST /api/v1/admin/logout
pub async fn admin_logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<Empty> {
    AuthService::logout(&state, &token);
    info!("Admin logged out: {}", session.username);
    Ok(Json(ApiResponse::success_with_message("Logged out")))
}

// ============================================================================
// Admin: History
// ============================================================================

/// GET /api/v1/admin/history
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<HistoryPage> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let filter = query.filter()?;
    ok(HistoryService::list(&state, filter, query.limit, query.offset)?)
}

/// GET /api/v1/admin/history/:id
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<HistoryRecord> {
    let id = path_param(id)?;
    ok(HistoryService::get(&state, id)?)
}

/// DELETE /api/v1/admin/history/:id
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<Empty> {
    let id = path_param(id)?;
    HistoryService::delete(&state, id, &session.username)?;
    Ok(Json(ApiResponse::success_with_message("Diagnosis deleted")))
}

/// GET /api/v1/admin/stats
pub async fn history_stats(State(state): State<Arc<AppState>>) -> ApiResult<HistoryStats> {
    ok(HistoryService::stats(&state)?)
}

// ============================================================================
// Admin: Reference data
// ============================================================================

/// PUT /api/v1/admin/industries
pub async fn put_industries(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<IndustriesUpload>, JsonRejection>,
) -> ApiResult<UpsertSummary> {
    let body = json_body(payload)?;
    let upserted = IndustryService::upsert_industries(&state, body.industries)?;
    ok(UpsertSummary { upserted })
}

/// PUT /api/v1/admin/benchmarks
pub async fn put_benchmarks(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<BenchmarksUpload>, JsonRejection>,
) -> ApiResult<UpsertSummary> {
    let body = json_body(payload)?;
    let rows = body.benchmarks.into_iter().map(Into::into).collect();
    let upserted = IndustryService::upsert_benchmarks(&state, rows)?;
    ok(UpsertSummary { upserted })
}
