//! SQLite database models

use crate::diagnosis::{DiagnosisResult, RiskLevel};
use serde::{Deserialize, Serialize};

/// Admin user model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

/// Industry code and display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    pub code: String,
    pub name: String,
}

/// Benchmark availability for an industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkKey {
    pub year: i32,
    pub firm_size_type: String,
}

/// History list row (no result blob)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub id: i64,
    pub company_name: String,
    pub industry_code: String,
    pub industry_name: String,
    pub year: i32,
    pub firm_size_type: String,
    pub risk_level: RiskLevel,
    pub created_at: String,
}

/// Full history record with the stored diagnosis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub industry_code: String,
    pub created_at: String,
    pub result: DiagnosisResult,
}

/// History list filters
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub risk_level: Option<RiskLevel>,
    pub industry_code: Option<String>,
    /// Substring match on company name
    pub company: Option<String>,
}

/// Counts per risk tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}
