//! Diagnosis data model

use super::ratio::{RatioName, RatioSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Company financial-statement figures plus identity
///
/// Every figure is optional; a ratio whose operands are missing is omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancialInput {
    pub company_name: String,
    pub industry_code: String,
    pub year: i32,
    pub firm_size_type: String,

    #[serde(default)]
    pub sales: Option<f64>,
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    #[serde(default)]
    pub quick_assets: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    #[serde(default)]
    pub equity: Option<f64>,
    #[serde(default)]
    pub operating_income: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub inventory: Option<f64>,
    #[serde(default)]
    pub receivables: Option<f64>,
    #[serde(default)]
    pub interest_expense: Option<f64>,
}

impl CompanyFinancialInput {
    /// Named numeric figures, for validation and logging
    pub fn figures(&self) -> [(&'static str, Option<f64>); 12] {
        [
            ("sales", self.sales),
            ("current_assets", self.current_assets),
            ("current_liabilities", self.current_liabilities),
            ("quick_assets", self.quick_assets),
            ("total_assets", self.total_assets),
            ("total_liabilities", self.total_liabilities),
            ("equity", self.equity),
            ("operating_income", self.operating_income),
            ("net_income", self.net_income),
            ("inventory", self.inventory),
            ("receivables", self.receivables),
            ("interest_expense", self.interest_expense),
        ]
    }
}

/// Industry-average reference row for one (industry, year, firm size)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub industry_code: String,
    pub industry_name: String,
    pub year: i32,
    pub firm_size_type: String,
    pub valid: bool,
    pub ratios: RatioSet,
}

/// Per-ratio judgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(RiskLevel::High),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "LOW" => Ok(RiskLevel::Low),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// One company-vs-benchmark comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub ratio_name: RatioName,
    pub ratio_name_kr: String,
    pub company_value: f64,
    pub industry_avg: f64,
    pub difference_pct: f64,
    pub status: Status,
    pub comment: String,
}

/// Complete diagnosis, persisted to history as an opaque blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub company_name: String,
    pub industry_name: String,
    pub year: i32,
    pub firm_size_type: String,
    pub calculated_ratios: RatioSet,
    pub industry_averages: RatioSet,
    pub comparisons: Vec<ComparisonResult>,
    pub risk_level: RiskLevel,
    pub overall_comment: String,
    pub recommendations: Vec<String>,
}

impl DiagnosisResult {
    pub fn count_status(&self, status: Status) -> usize {
        count_status(&self.comparisons, status)
    }
}

/// Number of comparisons carrying `status`
pub fn count_status(comparisons: &[ComparisonResult], status: Status) -> usize {
    comparisons.iter().filter(|c| c.status == status).count()
}
