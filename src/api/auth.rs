//! Bearer token guard for admin routes

use crate::error::{AppError, Result};
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Raw bearer token of the current request, kept for logout
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject the request unless it carries a live admin session
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?
        .to_string();

    let session = AuthService::authenticate(&state, &token)?;
    tracing::debug!("Admin request by {}: {}", session.username, request.uri().path());

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}
