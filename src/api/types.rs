//! REST API request and response types
//!
//! Form-driven clients often send figures as strings ("1,250,000") or leave
//! a field blank, so numeric fields accept numbers, numeric strings and
//! empty strings.

use crate::db::sqlite::models::{HistoryFilter, Industry};
use crate::diagnosis::{BenchmarkRow, CompanyFinancialInput, RatioSet, RiskLevel};
use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Custom Deserializers
// ============================================================================

fn parse_number<T: std::str::FromStr>(s: &str) -> std::result::Result<T, T::Err> {
    s.trim().replace(',', "").parse()
}

fn deserialize_optional_i32<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleOptInt {
        Int(i32),
        Float(f64),
        Str(String),
    }

    match Option::<FlexibleOptInt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlexibleOptInt::Int(i)) => Ok(Some(i)),
        Some(FlexibleOptInt::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i32)),
        Some(FlexibleOptInt::Float(f)) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {}",
            f
        ))),
        Some(FlexibleOptInt::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(FlexibleOptInt::Str(s)) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

fn deserialize_optional_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleOptFloat {
        Float(f64),
        Str(String),
    }

    match Option::<FlexibleOptFloat>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlexibleOptFloat::Float(f)) => Ok(Some(f)),
        Some(FlexibleOptFloat::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(FlexibleOptFloat::Str(s)) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Firm size codes arrive as "1" or 1
fn deserialize_flexible_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleString {
        Str(String),
        Int(i64),
    }

    match Option::<FlexibleString>::deserialize(deserializer)? {
        None => Ok(String::new()),
        Some(FlexibleString::Str(s)) => Ok(s),
        Some(FlexibleString::Int(i)) => Ok(i.to_string()),
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Common Types
// ============================================================================

/// Standard API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn success_with_data(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }
}

/// Empty data type for responses without data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

// ============================================================================
// Diagnosis
// ============================================================================

/// Diagnosis request - POST /api/v1/diagnosis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub industry_code: String,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_flexible_string")]
    pub firm_size_type: String,

    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub sales: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub current_assets: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub current_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub quick_assets: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub total_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub equity: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub operating_income: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub net_income: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub inventory: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub receivables: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub interest_expense: Option<f64>,
}

impl DiagnosisRequest {
    pub fn into_input(self) -> Result<CompanyFinancialInput> {
        let year = self
            .year
            .ok_or_else(|| AppError::Validation("year is required".to_string()))?;

        Ok(CompanyFinancialInput {
            company_name: self.company_name,
            industry_code: self.industry_code,
            year,
            firm_size_type: self.firm_size_type,
            sales: self.sales,
            current_assets: self.current_assets,
            current_liabilities: self.current_liabilities,
            quick_assets: self.quick_assets,
            total_assets: self.total_assets,
            total_liabilities: self.total_liabilities,
            equity: self.equity,
            operating_income: self.operating_income,
            net_income: self.net_income,
            inventory: self.inventory,
            receivables: self.receivables,
            interest_expense: self.interest_expense,
        })
    }
}

// ============================================================================
// Admin
// ============================================================================

/// Setup and login body
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// History list query - GET /api/v1/admin/history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub risk_level: Option<String>,
    pub industry_code: Option<String>,
    pub company: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl HistoryQuery {
    pub fn filter(&self) -> Result<HistoryFilter> {
        let risk_level = match self.risk_level.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<RiskLevel>().map_err(AppError::Validation)?),
        };

        Ok(HistoryFilter {
            risk_level,
            industry_code: self.industry_code.clone(),
            company: self.company.clone(),
        })
    }
}

/// Industry list upload - PUT /api/v1/admin/industries
#[derive(Debug, Clone, Deserialize)]
pub struct IndustriesUpload {
    pub industries: Vec<Industry>,
}

/// One benchmark row as uploaded
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkInput {
    pub industry_code: String,
    pub year: i32,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub firm_size_type: String,
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default)]
    pub ratios: RatioSet,
}

impl From<BenchmarkInput> for BenchmarkRow {
    fn from(input: BenchmarkInput) -> Self {
        BenchmarkRow {
            industry_code: input.industry_code,
            industry_name: String::new(),
            year: input.year,
            firm_size_type: input.firm_size_type,
            valid: input.valid,
            ratios: input.ratios,
        }
    }
}

/// Benchmark upload - PUT /api/v1/admin/benchmarks
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarksUpload {
    pub benchmarks: Vec<BenchmarkInput>,
}

/// Row count for upserts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub upserted: usize,
}
