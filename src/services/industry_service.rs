//! Industry Service
//!
//! Reference data: industry codes and benchmark rows.

use crate::db::sqlite::models::{BenchmarkKey, Industry};
use crate::diagnosis::BenchmarkRow;
use crate::error::{AppError, Result};
use crate::services::diagnosis_service::{MAX_YEAR, MIN_YEAR};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Benchmarks available for one industry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryBenchmarks {
    pub industry: Industry,
    pub benchmarks: Vec<BenchmarkKey>,
}

/// Industry service for business logic
pub struct IndustryService;

impl IndustryService {
    pub fn list(state: &AppState) -> Result<Vec<Industry>> {
        state.sqlite.list_industries()
    }

    /// (year, firm size) pairs with a valid benchmark
    pub fn benchmarks(state: &AppState, code: &str) -> Result<IndustryBenchmarks> {
        let name = state
            .sqlite
            .get_industry_name(code)?
            .ok_or_else(|| AppError::NotFound(format!("Unknown industry code '{}'", code)))?;

        Ok(IndustryBenchmarks {
            industry: Industry {
                code: code.to_string(),
                name,
            },
            benchmarks: state.sqlite.list_benchmark_keys(code)?,
        })
    }

    pub fn upsert_industries(state: &AppState, industries: Vec<Industry>) -> Result<usize> {
        let industries = industries
            .into_iter()
            .map(|i| Industry {
                code: i.code.trim().to_string(),
                name: i.name.trim().to_string(),
            })
            .collect::<Vec<_>>();

        if industries.is_empty() {
            return Err(AppError::Validation("No industries supplied".to_string()));
        }
        if let Some(bad) = industries
            .iter()
            .find(|i| i.code.is_empty() || i.name.is_empty())
        {
            return Err(AppError::Validation(format!(
                "Industry code and name are required (code='{}')",
                bad.code
            )));
        }

        let count = state.sqlite.upsert_industries(&industries)?;
        info!("IndustryService::upsert_industries - {} rows", count);
        Ok(count)
    }

    /// Benchmarks must reference a known industry and carry finite ratios
    pub fn upsert_benchmarks(state: &AppState, rows: Vec<BenchmarkRow>) -> Result<usize> {
        if rows.is_empty() {
            return Err(AppError::Validation("No benchmarks supplied".to_string()));
        }

        let mut cleaned = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.industry_code = row.industry_code.trim().to_string();
            row.firm_size_type = row.firm_size_type.trim().to_string();

            if row.industry_code.is_empty() || row.firm_size_type.is_empty() {
                return Err(AppError::Validation(
                    "industry_code and firm_size_type are required".to_string(),
                ));
            }
            if !(MIN_YEAR..=MAX_YEAR).contains(&row.year) {
                return Err(AppError::Validation(format!(
                    "year must be between {} and {}",
                    MIN_YEAR, MAX_YEAR
                )));
            }
            if let Some((name, _)) = row.ratios.iter().find(|(_, v)| !v.is_finite()) {
                return Err(AppError::Validation(format!(
                    "{} must be a finite number",
                    name
                )));
            }
            if state.sqlite.get_industry_name(&row.industry_code)?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Unknown industry code '{}'",
                    row.industry_code
                )));
            }
            cleaned.push(row);
        }

        let count = state.sqlite.upsert_benchmarks(&cleaned)?;
        info!("IndustryService::upsert_benchmarks - {} rows", count);
        Ok(count)
    }
}
