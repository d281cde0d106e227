//! History Service
//!
//! Admin browsing of past diagnoses.

use crate::db::sqlite::models::{HistoryFilter, HistoryRecord, HistoryStats, HistorySummary};
use crate::error::{AppError, Result};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<HistorySummary>,
    pub total: i64,
    pub limit: usize,
    pub offset: usize,
}

/// History service for business logic
pub struct HistoryService;

impl HistoryService {
    /// List history with filters; `limit` defaults to 20 and is capped at 100
    pub fn list(
        state: &AppState,
        filter: HistoryFilter,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<HistoryPage> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        let offset = offset.unwrap_or(0);
        let sql_offset = i64::try_from(offset).map_err(|_| {
            AppError::Validation(format!("offset must be at most {}", i64::MAX))
        })?;

        let filter = HistoryFilter {
            company: filter
                .company
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            industry_code: filter
                .industry_code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            ..filter
        };

        let items = state.sqlite.list_history(&filter, limit as i64, sql_offset)?;
        let total = state.sqlite.count_history(&filter)?;

        Ok(HistoryPage {
            items,
            total,
            limit,
            offset,
        })
    }

    pub fn get(state: &AppState, id: i64) -> Result<HistoryRecord> {
        state
            .sqlite
            .get_history(id)?
            .ok_or_else(|| AppError::NotFound(format!("Diagnosis {} not found", id)))
    }

    pub fn delete(state: &AppState, id: i64, admin: &str) -> Result<()> {
        if !state.sqlite.delete_history(id)? {
            return Err(AppError::NotFound(format!("Diagnosis {} not found", id)));
        }
        info!("HistoryService::delete - id={} by {}", id, admin);
        Ok(())
    }

    pub fn stats(state: &AppState) -> Result<HistoryStats> {
        state.sqlite.history_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::db::SqliteDb;
    use crate::diagnosis::{DiagnosisResult, RatioSet, RiskLevel};
    use crate::security::{HashingManager, SecurityManager};
    use std::sync::Arc;

    fn state_with(n: usize) -> AppState {
        let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
        let security = Arc::new(SecurityManager::with_pepper(&HashingManager::generate_pepper()));
        let state = AppState::from_parts(sqlite, security, ServerConfig::default());

        for i in 0..n {
            let result = DiagnosisResult {
                company_name: format!("Company {}", i),
                industry_name: "식료품 제조업".into(),
                year: 2023,
                firm_size_type: "1".into(),
                calculated_ratios: RatioSet::new(),
                industry_averages: RatioSet::new(),
                comparisons: Vec::new(),
                risk_level: if i % 2 == 0 { RiskLevel::Low } else { RiskLevel::High },
                overall_comment: String::new(),
                recommendations: Vec::new(),
            };
            state.sqlite.insert_diagnosis("C10", &result).unwrap();
        }
        state
    }

    #[test]
    fn test_pagination_defaults_and_total() {
        let state = state_with(25);

        let page = HistoryService::list(&state, HistoryFilter::default(), None, None).unwrap();
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 25);

        let last = HistoryService::list(&state, HistoryFilter::default(), Some(10), Some(20)).unwrap();
        assert_eq!(last.items.len(), 5);
    }

    #[test]
    fn test_limit_bounds() {
        let state = state_with(1);
        assert!(HistoryService::list(&state, HistoryFilter::default(), Some(0), None).is_err());
        assert!(HistoryService::list(&state, HistoryFilter::default(), Some(101), None).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_offset_beyond_sql_range_rejected() {
        let state = state_with(2);
        let huge = i64::MAX as usize + 1;
        assert!(matches!(
            HistoryService::list(&state, HistoryFilter::default(), None, Some(huge)),
            Err(AppError::Validation(_))
        ));

        let past_end =
            HistoryService::list(&state, HistoryFilter::default(), None, Some(i64::MAX as usize))
                .unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 2);
    }

    #[test]
    fn test_blank_company_filter_is_ignored() {
        let state = state_with(3);
        let filter = HistoryFilter {
            company: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(HistoryService::list(&state, filter, None, None).unwrap().total, 3);
    }

    #[test]
    fn test_get_and_delete_missing() {
        let state = state_with(1);
        assert!(matches!(HistoryService::get(&state, 42), Err(AppError::NotFound(_))));
        assert!(matches!(
            HistoryService::delete(&state, 42, "admin"),
            Err(AppError::NotFound(_))
        ));

        let stats = HistoryService::stats(&state).unwrap();
        assert_eq!(stats.total, 1);
    }
}
