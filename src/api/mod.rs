//! REST API module
//!
//! Provides:
//! - Financial ratio diagnosis (POST /api/v1/diagnosis)
//! - Industry and benchmark reference data (/api/v1/industries)
//! - Admin login, diagnosis history and reference data upload (/api/v1/admin/*)

pub mod auth;
pub mod handlers;
pub mod rate_limiter;
mod server;
pub mod types;

pub use server::{router, ApiServer};
pub use types::{ApiResponse, DiagnosisRequest, Empty};
