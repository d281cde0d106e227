//! Ratio comparator
//!
//! Compares each computed ratio with its industry average and assigns a
//! status from the percentage difference and the ratio's polarity.

use super::model::{ComparisonResult, Status};
use super::ratio::{round2, to_decimal, Polarity, RatioName, RatioSet};
use rust_decimal::Decimal;

/// Band around the industry average, in percent
pub const WARNING_BAND_PCT: Decimal = Decimal::TEN;

/// Percentage difference of company value against benchmark, unrounded
///
/// Returns `None` when the benchmark is zero or either value is not finite.
pub fn difference_pct(company: f64, benchmark: f64) -> Option<Decimal> {
    let company = to_decimal(company)?;
    let benchmark = to_decimal(benchmark).filter(|b| !b.is_zero())?;
    company
        .checked_sub(benchmark)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(benchmark)
}

/// Status for an unrounded percentage difference
///
/// Higher-is-better: `>= +10` good, `[-10, +10)` warning, `< -10` danger.
/// Lower-is-better: `<= -10` good, `(-10, +10]` warning, `> +10` danger.
pub fn classify(diff: Decimal, polarity: Polarity) -> Status {
    match polarity {
        Polarity::HigherIsBetter => {
            if diff >= WARNING_BAND_PCT {
                Status::Good
            } else if diff >= -WARNING_BAND_PCT {
                Status::Warning
            } else {
                Status::Danger
            }
        }
        Polarity::LowerIsBetter => {
            if diff <= -WARNING_BAND_PCT {
                Status::Good
            } else if diff <= WARNING_BAND_PCT {
                Status::Warning
            } else {
                Status::Danger
            }
        }
    }
}

/// Human-readable comment for one comparison
pub fn comment(diff_pct: f64, status: Status) -> String {
    let verdict = match status {
        Status::Good => "양호",
        Status::Warning => "주의",
        Status::Danger => "위험",
    };

    if diff_pct > 0.0 {
        format!("업종 평균 대비 {:.2}% 높음 ({})", diff_pct, verdict)
    } else if diff_pct < 0.0 {
        format!("업종 평균 대비 {:.2}% 낮음 ({})", diff_pct.abs(), verdict)
    } else {
        format!("업종 평균과 동일 ({})", verdict)
    }
}

/// Compare every ratio present on both sides, in canonical order
pub fn compare_ratios(company: &RatioSet, benchmark: &RatioSet) -> Vec<ComparisonResult> {
    RatioName::ALL
        .iter()
        .filter_map(|&name| {
            let company_value = company.get(name)?;
            let industry_avg = benchmark.get(name)?;
            let diff = difference_pct(company_value, industry_avg)?;

            let status = classify(diff, name.polarity());
            let rounded = round2(diff)?;

            Some(ComparisonResult {
                ratio_name: name,
                ratio_name_kr: name.korean_name().to_string(),
                company_value,
                industry_avg,
                difference_pct: rounded,
                status,
                comment: comment(rounded, status),
            })
        })
        .collect()
}
