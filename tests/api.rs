//! HTTP-level tests for the diagnosis API.
//!
//! Each test builds the full router over an in-memory database and drives
//! it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use findiag::api::router;
use findiag::config::{RateLimitConfig, ServerConfig};
use findiag::db::SqliteDb;
use findiag::security::{HashingManager, SecurityManager};
use findiag::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "Admin#2024";

// ── Test app builder ───────────────────────────────────────────

fn build_app(config: ServerConfig) -> Router {
    let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
    let security = Arc::new(SecurityManager::with_pepper(&HashingManager::generate_pepper()));
    router(Arc::new(AppState::from_parts(sqlite, security, config)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

async fn admin_token(app: &Router) -> String {
    let (status, _, _) = send(
        app,
        "POST",
        "/api/v1/admin/setup",
        None,
        Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        app,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn seed_reference_data(app: &Router, token: &str) {
    let (status, _, body) = send(
        app,
        "PUT",
        "/api/v1/admin/industries",
        Some(token),
        Some(json!({"industries": [{"code": "C10", "name": "식료품 제조업"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["upserted"], 1);

    let (status, _, _) = send(
        app,
        "PUT",
        "/api/v1/admin/benchmarks",
        Some(token),
        Some(json!({"benchmarks": [{
            "industry_code": "C10",
            "year": 2023,
            "firm_size_type": "1",
            "ratios": {
                "current_ratio": 150.0,
                "debt_ratio": 150.0,
                "operating_margin": 6.0
            }
        }]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

fn company() -> Value {
    json!({
        "company_name": "Hanbit Foods",
        "industry_code": "C10",
        "year": 2023,
        "firm_size_type": "1",
        "sales": "10,000",
        "operating_income": 500,
        "current_assets": 2000,
        "current_liabilities": 1500,
        "total_liabilities": 2500,
        "equity": 1500
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_responds() {
    let app = build_app(ServerConfig::default());
    let (status, _, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn diagnosis_end_to_end() {
    let app = build_app(ServerConfig::default());
    let token = admin_token(&app).await;
    seed_reference_data(&app, &token).await;

    let (status, _, body) = send(&app, "GET", "/api/v1/industries", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["code"], "C10");

    let (status, _, body) =
        send(&app, "GET", "/api/v1/industries/C10/benchmarks", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["benchmarks"][0]["year"], 2023);

    let (status, _, body) = send(&app, "POST", "/api/v1/diagnosis", None, Some(company())).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["industry_name"], "식료품 제조업");
    assert_eq!(data["risk_level"], "HIGH");
    assert_eq!(data["calculated_ratios"]["current_ratio"], 133.33);
    assert_eq!(data["calculated_ratios"]["debt_ratio"], 166.67);
    assert_eq!(data["calculated_ratios"]["operating_margin"], 5.0);

    let comparisons = data["comparisons"].as_array().unwrap();
    let names: Vec<&str> = comparisons
        .iter()
        .map(|c| c["ratio_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["current_ratio", "debt_ratio", "operating_margin"]);
    assert!(comparisons.iter().all(|c| c["status"] == "danger"));
    assert_eq!(data["recommendations"].as_array().unwrap().len(), 3);

    let history_id = data["history_id"].as_i64().unwrap();

    // History is admin-only
    let (status, _, body) = send(
        &app,
        "GET",
        "/api/v1/admin/history?risk_level=high",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["company_name"], "Hanbit Foods");

    let (status, _, body) = send(&app, "GET", "/api/v1/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["high"], 1);

    let uri = format!("/api/v1/admin/history/{}", history_id);
    let (status, _, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"]["risk_level"], "HIGH");

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn diagnosis_error_statuses() {
    let app = build_app(ServerConfig::default());
    let token = admin_token(&app).await;
    seed_reference_data(&app, &token).await;

    let mut unknown = company();
    unknown["industry_code"] = json!("Z99");
    let (status, _, _) = send(&app, "POST", "/api/v1/diagnosis", None, Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut no_benchmark = company();
    no_benchmark["year"] = json!(2015);
    let (status, _, _) = send(&app, "POST", "/api/v1/diagnosis", None, Some(no_benchmark)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut blank = company();
    blank["company_name"] = json!("  ");
    let (status, _, body) = send(&app, "POST", "/api/v1/diagnosis", None, Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let mut garbled = company();
    garbled["sales"] = json!("a lot");
    let (status, _, _) = send(&app, "POST", "/api/v1/diagnosis", None, Some(garbled)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_offset_out_of_range_is_bad_request() {
    let app = build_app(ServerConfig::default());
    let token = admin_token(&app).await;

    let (status, _, body) = send(
        &app,
        "GET",
        "/api/v1/admin/history?offset=18446744073709551615",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_routes_require_live_session() {
    let app = build_app(ServerConfig::default());

    let (status, _, _) = send(&app, "GET", "/api/v1/admin/history", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, "GET", "/api/v1/admin/stats", Some("deadbeef"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&app).await;
    let (status, _, _) = send(&app, "POST", "/api/v1/admin/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/v1/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn setup_is_one_shot_and_login_checks_password() {
    let app = build_app(ServerConfig::default());
    admin_token(&app).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/v1/admin/setup",
        None,
        Some(json!({"username": "intruder", "password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(json!({"username": "admin", "password": "Wrong#2024"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_is_rate_limited() {
    let app = build_app(ServerConfig {
        rate_limits: RateLimitConfig {
            general: 100,
            diagnosis: 20,
            login: 1,
        },
        ..ServerConfig::default()
    });

    let credentials = json!({"username": "nobody", "password": ADMIN_PASSWORD});
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, headers, body) =
        send(&app, "POST", "/api/v1/admin/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");

    // Other categories are unaffected
    let (status, _, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
