//! Services Layer
//!
//! Business logic called by the REST API handlers. Handlers parse and
//! shape HTTP; services validate, talk to storage and run the diagnosis.
//!
//! # Architecture
//!
//! ```text
//! HTTP client --> REST API handlers --> Services --> Diagnosis engine
//!                                                └─> SQLite
//! ```
//!
//! # Services
//!
//! - `DiagnosisService` - Validate input, resolve benchmark, diagnose, record
//! - `HistoryService` - Browse, inspect and delete past diagnoses
//! - `IndustryService` - Industry codes and benchmark reference data
//! - `AuthService` - Admin setup, login/logout, token resolution

pub mod auth_service;
pub mod diagnosis_service;
pub mod history_service;
pub mod industry_service;

pub use auth_service::{AuthService, LoginResult};
pub use diagnosis_service::{DiagnosisOutcome, DiagnosisService};
pub use history_service::{HistoryPage, HistoryService};
pub use industry_service::{IndustryBenchmarks, IndustryService};
