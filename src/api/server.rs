//! HTTP server for the REST API
//!
//! Provides:
//! - Public diagnosis and reference data endpoints (/api/v1/*)
//! - Token-guarded admin endpoints (/api/v1/admin/*)
//! - Per-category rate limiting

use crate::api::auth::require_admin;
use crate::api::handlers;
use crate::api::rate_limiter::{rate_limit_middleware, RateLimiterState};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let limits = state.config.rate_limits;
    info!(
        "Rate limits: General={}/s, Diagnosis={}/s, Login={}/s",
        limits.general, limits.diagnosis, limits.login
    );
    let rate_limiter = Arc::new(RateLimiterState::new(limits));

    // Admin routes behind the bearer token guard
    let admin = Router::new()
        .route("/api/v1/admin/logout", post(handlers::admin_logout))
        .route("/api/v1/admin/history", get(handlers::list_history))
        .route(
            "/api/v1/admin/history/:id",
            get(handlers::get_history).delete(handlers::delete_history),
        )
        .route("/api/v1/admin/stats", get(handlers::history_stats))
        .route("/api/v1/admin/industries", put(handlers::put_industries))
        .route("/api/v1/admin/benchmarks", put(handlers::put_benchmarks))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))

        // ================================================================
        // Public API v1
        // ================================================================
        .route("/api/v1/industries", get(handlers::list_industries))
        .route(
            "/api/v1/industries/:code/benchmarks",
            get(handlers::industry_benchmarks),
        )
        .route("/api/v1/diagnosis", post(handlers::diagnose))

        // ================================================================
        // Admin
        // ================================================================
        .route("/api/v1/admin/setup", post(handlers::admin_setup))
        .route("/api/v1/admin/login", post(handlers::admin_login))
        .merge(admin)

        // ================================================================
        // Add state and middleware
        // ================================================================
        .with_state(state)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
}

/// API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    serve_handle: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
            serve_handle: None,
        }
    }

    /// Bind and serve in the background, returns the bound address
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr = self.state.config.socket_addr()?;
        let app = router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting diagnosis API server on {}", local_addr);

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });
        self.serve_handle = Some(handle);

        info!("=== Endpoints ===");
        info!("  GET    http://{}/health", local_addr);
        info!("  GET    http://{}/api/v1/industries", local_addr);
        info!("  GET    http://{}/api/v1/industries/{{code}}/benchmarks", local_addr);
        info!("  POST   http://{}/api/v1/diagnosis", local_addr);
        info!("  POST   http://{}/api/v1/admin/setup", local_addr);
        info!("  POST   http://{}/api/v1/admin/login", local_addr);
        info!("  GET    http://{}/api/v1/admin/history", local_addr);
        info!("  GET    http://{}/api/v1/admin/stats", local_addr);

        Ok(local_addr)
    }

    /// Signal the server to stop without waiting
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Stop the server and wait for in-flight requests to drain
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(handle) = self.serve_handle.take() {
            if let Err(e) = handle.await {
                error!("API server task failed: {}", e);
            }
            info!("API server stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
