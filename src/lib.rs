//! FinDiag - Financial Statement Risk Diagnosis
//!
//! Computes a company's financial ratios from its statement figures,
//! compares them against industry averages for the same year and firm
//! size, and reports a risk tier with a short narrative and
//! recommendations. Served over a small REST API with admin-only
//! diagnosis history.

pub mod api;
pub mod config;
pub mod db;
pub mod diagnosis;
pub mod error;
pub mod scheduler;
pub mod security;
pub mod services;
pub mod state;

use api::ApiServer;
use config::ServerConfig;
use scheduler::SessionSweeper;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use diagnosis::{diagnose, BenchmarkRow, CompanyFinancialInput, DiagnosisResult};

/// Initialize logging, open storage and serve until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "findiag=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FinDiag...");

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    let sweeper = SessionSweeper::new(state.clone()).start();

    let mut server = ApiServer::new(state);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.shutdown().await;
    sweeper.abort();

    Ok(())
}
