//! Diagnosis engine
//!
//! Pure, synchronous pipeline:
//!
//! ```text
//! CompanyFinancialInput ──> calculator ──> comparator ──> classifier ──> narrative
//!                                              ▲
//!                          BenchmarkRow ───────┘
//! ```
//!
//! The engine performs no I/O and holds no state. The caller is responsible
//! for validating identity fields and resolving the benchmark row first.

pub mod calculator;
pub mod classifier;
pub mod comparator;
pub mod model;
pub mod narrative;
pub mod ratio;

pub use model::{
    BenchmarkRow, CompanyFinancialInput, ComparisonResult, DiagnosisResult, RiskLevel, Status,
};
pub use ratio::{Polarity, RatioCategory, RatioName, RatioSet};

/// Run the full pipeline for one company against its benchmark row
pub fn diagnose(financials: &CompanyFinancialInput, benchmark: &BenchmarkRow) -> DiagnosisResult {
    let calculated_ratios = calculator::calculate_ratios(financials);
    let comparisons = comparator::compare_ratios(&calculated_ratios, &benchmark.ratios);
    let risk_level = classifier::classify_risk(&comparisons);
    let overall_comment = narrative::overall_comment(&comparisons, risk_level);
    let recommendations = narrative::recommendations(&comparisons);

    DiagnosisResult {
        company_name: financials.company_name.clone(),
        industry_name: benchmark.industry_name.clone(),
        year: financials.year,
        firm_size_type: financials.firm_size_type.clone(),
        calculated_ratios,
        industry_averages: benchmark.ratios.clone(),
        comparisons,
        risk_level,
        overall_comment,
        recommendations,
    }
}
