//! Diagnosis Service
//!
//! Caller-side wrapper around the diagnosis engine: validates the request,
//! resolves the benchmark row, runs the pipeline and records the result.

use crate::diagnosis::{self, CompanyFinancialInput, DiagnosisResult};
use crate::error::{AppError, Result};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Earliest and latest fiscal year accepted
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Diagnosis plus the id it was stored under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisOutcome {
    pub history_id: i64,
    #[serde(flatten)]
    pub result: DiagnosisResult,
}

/// Diagnosis service for business logic
pub struct DiagnosisService;

impl DiagnosisService {
    /// Validate, resolve benchmark, diagnose and persist
    pub fn diagnose(state: &AppState, input: CompanyFinancialInput) -> Result<DiagnosisOutcome> {
        let input = Self::validate(input)?;

        info!(
            "DiagnosisService::diagnose - company={}, industry={}, year={}, size={}",
            input.company_name, input.industry_code, input.year, input.firm_size_type
        );

        if state.sqlite.get_industry_name(&input.industry_code)?.is_none() {
            warn!("Unknown industry code: {}", input.industry_code);
            return Err(AppError::NotFound(format!(
                "Unknown industry code '{}'",
                input.industry_code
            )));
        }

        let benchmark = state
            .sqlite
            .find_benchmark(&input.industry_code, input.year, &input.firm_size_type)?
            .ok_or_else(|| {
                warn!(
                    "No benchmark for industry={}, year={}, size={}",
                    input.industry_code, input.year, input.firm_size_type
                );
                AppError::NotFound(format!(
                    "No industry benchmark for {} / {} / firm size {}",
                    input.industry_code, input.year, input.firm_size_type
                ))
            })?;

        let result = diagnosis::diagnose(&input, &benchmark);

        debug!(
            "Computed {} ratios, {} comparisons, risk={}",
            result.calculated_ratios.len(),
            result.comparisons.len(),
            result.risk_level
        );

        let history_id = state.sqlite.insert_diagnosis(&input.industry_code, &result)?;

        info!(
            "Diagnosis stored: id={}, company={}, risk={}",
            history_id, result.company_name, result.risk_level
        );

        Ok(DiagnosisOutcome { history_id, result })
    }

    /// Reject inputs the engine must never see
    pub fn validate(mut input: CompanyFinancialInput) -> Result<CompanyFinancialInput> {
        input.company_name = input.company_name.trim().to_string();
        input.industry_code = input.industry_code.trim().to_string();
        input.firm_size_type = input.firm_size_type.trim().to_string();

        if input.company_name.is_empty() {
            return Err(AppError::Validation("company_name is required".to_string()));
        }
        if input.industry_code.is_empty() {
            return Err(AppError::Validation("industry_code is required".to_string()));
        }
        if input.firm_size_type.is_empty() {
            return Err(AppError::Validation("firm_size_type is required".to_string()));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&input.year) {
            return Err(AppError::Validation(format!(
                "year must be between {} and {}",
                MIN_YEAR, MAX_YEAR
            )));
        }

        for (name, value) in input.figures() {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(AppError::Validation(format!("{} must be a finite number", name)));
                }
            }
        }

        Ok(input)
    }
}
