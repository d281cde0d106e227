//! Narrative generator: overall comment and recommendations

use super::model::{count_status, ComparisonResult, RiskLevel, Status};

/// Single recommendation emitted when nothing is in the danger zone
pub const MAINTAIN_RECOMMENDATION: &str =
    "현재 재무 상태가 업종 평균 대비 양호합니다. 현 수준을 유지하면서 정기적으로 재무 지표를 점검하세요.";

/// Overall comment keyed by risk tier
pub fn overall_comment(comparisons: &[ComparisonResult], risk: RiskLevel) -> String {
    match risk {
        RiskLevel::High => format!(
            "{}개 지표가 업종 평균 대비 위험 수준입니다. 재무구조 전반에 대한 긴급한 점검이 필요합니다.",
            count_status(comparisons, Status::Danger)
        ),
        RiskLevel::Medium => format!(
            "{}개 지표가 업종 평균 대비 위험 수준입니다. 해당 지표를 중심으로 개선 방안을 마련하세요.",
            count_status(comparisons, Status::Danger)
        ),
        RiskLevel::Low => format!(
            "{}개 지표가 업종 평균보다 양호합니다. 전반적으로 안정적인 재무 상태입니다.",
            count_status(comparisons, Status::Good)
        ),
    }
}

/// One advisory per danger comparison, in comparison order
pub fn recommendations(comparisons: &[ComparisonResult]) -> Vec<String> {
    let advice: Vec<String> = comparisons
        .iter()
        .filter(|c| c.status == Status::Danger)
        .map(|c| c.ratio_name.recommendation().to_string())
        .collect();

    if advice.is_empty() {
        vec![MAINTAIN_RECOMMENDATION.to_string()]
    } else {
        advice
    }
}
