//! Risk tier from the number of danger comparisons

use super::model::{count_status, ComparisonResult, RiskLevel, Status};

/// Danger count at or above which the company is HIGH risk
pub const HIGH_RISK_DANGER_COUNT: usize = 3;
/// Danger count that makes the company MEDIUM risk
pub const MEDIUM_RISK_DANGER_COUNT: usize = 2;

/// Map a danger count to a risk tier
pub fn risk_for_danger_count(danger: usize) -> RiskLevel {
    if danger >= HIGH_RISK_DANGER_COUNT {
        RiskLevel::High
    } else if danger == MEDIUM_RISK_DANGER_COUNT {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn classify_risk(comparisons: &[ComparisonResult]) -> RiskLevel {
    risk_for_danger_count(count_status(comparisons, Status::Danger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::ratio::RatioName;

    fn comparison(ratio_name: RatioName, status: Status) -> ComparisonResult {
        ComparisonResult {
            ratio_name,
            ratio_name_kr: ratio_name.korean_name().to_string(),
            company_value: 1.0,
            industry_avg: 1.0,
            difference_pct: 0.0,
            status,
            comment: String::new(),
        }
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(risk_for_danger_count(0), RiskLevel::Low);
        assert_eq!(risk_for_danger_count(1), RiskLevel::Low);
        assert_eq!(risk_for_danger_count(2), RiskLevel::Medium);
        assert_eq!(risk_for_danger_count(3), RiskLevel::High);
        assert_eq!(risk_for_danger_count(12), RiskLevel::High);
    }

    #[test]
    fn test_good_and_warning_do_not_count() {
        let mut comparisons: Vec<_> = RatioName::ALL[..10]
            .iter()
            .map(|&r| comparison(r, Status::Good))
            .collect();
        comparisons.push(comparison(RatioName::InventoryTurnover, Status::Danger));
        comparisons.push(comparison(RatioName::ReceivableTurnover, Status::Warning));

        assert_eq!(classify_risk(&comparisons), RiskLevel::Low);

        comparisons[0].status = Status::Danger;
        assert_eq!(classify_risk(&comparisons), RiskLevel::Medium);

        comparisons[1].status = Status::Danger;
        assert_eq!(classify_risk(&comparisons), RiskLevel::High);
    }

    #[test]
    fn test_empty_is_low() {
        assert_eq!(classify_risk(&[]), RiskLevel::Low);
    }
}
