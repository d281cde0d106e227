//! Ratio catalogue
//!
//! The twelve financial ratios the engine knows about, in canonical report
//! order (liquidity, stability, profitability, activity), together with the
//! static metadata attached to each: display name, polarity, unit and the
//! remediation advice used when the ratio lands in the danger zone.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Ratio identifier
///
/// Variant order is the canonical report order; `Ord` is derived from it so
/// ordered maps keyed by `RatioName` iterate canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioName {
    CurrentRatio,
    QuickRatio,
    DebtRatio,
    EquityRatio,
    InterestCoverage,
    OperatingMargin,
    NetMargin,
    Roa,
    Roe,
    AssetTurnover,
    InventoryTurnover,
    ReceivableTurnover,
}

/// Analysis category a ratio belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioCategory {
    Liquidity,
    Stability,
    Profitability,
    Activity,
}

/// Whether a higher or a lower value is favourable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl RatioName {
    /// All ratios in canonical order
    pub const ALL: [RatioName; 12] = [
        RatioName::CurrentRatio,
        RatioName::QuickRatio,
        RatioName::DebtRatio,
        RatioName::EquityRatio,
        RatioName::InterestCoverage,
        RatioName::OperatingMargin,
        RatioName::NetMargin,
        RatioName::Roa,
        RatioName::Roe,
        RatioName::AssetTurnover,
        RatioName::InventoryTurnover,
        RatioName::ReceivableTurnover,
    ];

    /// Snake-case identifier (also the JSON key and DB column name)
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioName::CurrentRatio => "current_ratio",
            RatioName::QuickRatio => "quick_ratio",
            RatioName::DebtRatio => "debt_ratio",
            RatioName::EquityRatio => "equity_ratio",
            RatioName::InterestCoverage => "interest_coverage",
            RatioName::OperatingMargin => "operating_margin",
            RatioName::NetMargin => "net_margin",
            RatioName::Roa => "roa",
            RatioName::Roe => "roe",
            RatioName::AssetTurnover => "asset_turnover",
            RatioName::InventoryTurnover => "inventory_turnover",
            RatioName::ReceivableTurnover => "receivable_turnover",
        }
    }

    /// Korean display name
    pub fn korean_name(&self) -> &'static str {
        match self {
            RatioName::CurrentRatio => "유동비율",
            RatioName::QuickRatio => "당좌비율",
            RatioName::DebtRatio => "부채비율",
            RatioName::EquityRatio => "자기자본비율",
            RatioName::InterestCoverage => "이자보상배율",
            RatioName::OperatingMargin => "매출액영업이익률",
            RatioName::NetMargin => "매출액순이익률",
            RatioName::Roa => "총자산순이익률(ROA)",
            RatioName::Roe => "자기자본순이익률(ROE)",
            RatioName::AssetTurnover => "총자산회전율",
            RatioName::InventoryTurnover => "재고자산회전율",
            RatioName::ReceivableTurnover => "매출채권회전율",
        }
    }

    pub fn category(&self) -> RatioCategory {
        match self {
            RatioName::CurrentRatio | RatioName::QuickRatio => RatioCategory::Liquidity,
            RatioName::DebtRatio | RatioName::EquityRatio | RatioName::InterestCoverage => {
                RatioCategory::Stability
            }
            RatioName::OperatingMargin | RatioName::NetMargin | RatioName::Roa | RatioName::Roe => {
                RatioCategory::Profitability
            }
            RatioName::AssetTurnover
            | RatioName::InventoryTurnover
            | RatioName::ReceivableTurnover => RatioCategory::Activity,
        }
    }

    /// Only the debt ratio is lower-is-better
    pub fn polarity(&self) -> Polarity {
        match self {
            RatioName::DebtRatio => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }

    /// Display unit: percentage ratios are scaled by 100, turnover/coverage are multiples
    pub fn unit(&self) -> &'static str {
        match self {
            RatioName::InterestCoverage
            | RatioName::AssetTurnover
            | RatioName::InventoryTurnover
            | RatioName::ReceivableTurnover => "x",
            _ => "%",
        }
    }

    /// Remediation advice emitted when this ratio is in the danger zone
    pub fn recommendation(&self) -> &'static str {
        match self {
            RatioName::CurrentRatio => {
                "유동비율이 낮습니다. 단기 차입금 상환 계획을 점검하고 유동자산 확보 방안을 마련하세요."
            }
            RatioName::QuickRatio => {
                "당좌비율이 낮습니다. 재고 의존도를 줄이고 현금성 자산 비중을 높이세요."
            }
            RatioName::DebtRatio => {
                "부채비율이 높습니다. 차입금 감축 또는 자본 확충을 통해 재무구조를 개선하세요."
            }
            RatioName::EquityRatio => {
                "자기자본비율이 낮습니다. 이익 유보 확대나 증자를 통해 자기자본을 강화하세요."
            }
            RatioName::InterestCoverage => {
                "이자보상배율이 낮습니다. 고금리 차입금을 우선 상환하고 영업이익 개선에 집중하세요."
            }
            RatioName::OperatingMargin => {
                "영업이익률이 낮습니다. 원가 구조와 판매관리비를 재검토하세요."
            }
            RatioName::NetMargin => {
                "순이익률이 낮습니다. 영업외비용과 금융비용 관리를 강화하세요."
            }
            RatioName::Roa => {
                "총자산순이익률이 낮습니다. 유휴 자산을 정리하고 자산 활용도를 높이세요."
            }
            RatioName::Roe => {
                "자기자본순이익률이 낮습니다. 수익성 높은 사업에 자본을 집중하세요."
            }
            RatioName::AssetTurnover => {
                "총자산회전율이 낮습니다. 매출 확대 또는 비효율 자산 축소를 검토하세요."
            }
            RatioName::InventoryTurnover => {
                "재고자산회전율이 낮습니다. 재고 관리 체계를 점검하고 과잉 재고를 줄이세요."
            }
            RatioName::ReceivableTurnover => {
                "매출채권회전율이 낮습니다. 채권 회수 기간을 단축하고 신용 관리를 강화하세요."
            }
        }
    }
}

impl fmt::Display for RatioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RatioName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RatioName::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown ratio: {}", s))
    }
}

/// Ratio name to value, iterated in canonical order
///
/// Absent ratios are simply not present; there is no null-as-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioSet(BTreeMap<RatioName, f64>);

impl RatioSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: RatioName, value: f64) {
        self.0.insert(name, value);
    }

    /// Insert only when a value is present
    pub fn insert_opt(&mut self, name: RatioName, value: Option<f64>) {
        if let Some(v) = value {
            self.0.insert(name, v);
        }
    }

    pub fn get(&self, name: RatioName) -> Option<f64> {
        self.0.get(&name).copied()
    }

    pub fn contains(&self, name: RatioName) -> bool {
        self.0.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioName, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(RatioName, f64)> for RatioSet {
    fn from_iter<I: IntoIterator<Item = (RatioName, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decimal view of a reported figure; `None` for NaN, infinities and out-of-range values
///
/// Goes through the shortest round-trip string, so `0.1` becomes exactly `0.1`.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Round half away from zero to two decimal places, back to `f64`
pub fn round2(value: Decimal) -> Option<f64> {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .ok()
}
