//! Ratio calculator
//!
//! Raw figures in, rounded ratio set out. A ratio is produced only when every
//! operand is usable (present, finite, non-zero); otherwise the key is omitted.
//! Arithmetic runs in `Decimal` so two-decimal rounding sees the exact quotient.

use super::model::CompanyFinancialInput;
use super::ratio::{round2, to_decimal, RatioName, RatioSet};
use rust_decimal::Decimal;

/// Operand usable in a formula
fn usable(value: Option<f64>) -> Option<Decimal> {
    let value = value.filter(|v| v.is_finite() && *v != 0.0)?;
    to_decimal(value).filter(|d| !d.is_zero())
}

/// numerator * scale / denominator, rounded; `None` on any unusable operand
fn ratio(
    numerator: Option<Decimal>,
    denominator: Option<Decimal>,
    scale: Decimal,
) -> Option<f64> {
    let n = numerator.filter(|n| !n.is_zero())?;
    let d = denominator.filter(|d| !d.is_zero())?;
    round2(n.checked_mul(scale)?.checked_div(d)?)
}

fn percent(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<f64> {
    ratio(numerator, denominator, Decimal::ONE_HUNDRED)
}

fn times(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<f64> {
    ratio(numerator, denominator, Decimal::ONE)
}

/// Supplied quick assets when present, else current assets less inventory
///
/// A supplied figure is never replaced by the derived one, even when unusable.
fn quick_assets(input: &CompanyFinancialInput) -> Option<Decimal> {
    if input.quick_assets.is_some() {
        return usable(input.quick_assets);
    }
    let ca = usable(input.current_assets)?;
    let inv = usable(input.inventory)?;
    ca.checked_sub(inv)
}

/// Compute every ratio the input supports
pub fn calculate_ratios(input: &CompanyFinancialInput) -> RatioSet {
    let mut set = RatioSet::new();

    set.insert_opt(
        RatioName::CurrentRatio,
        percent(usable(input.current_assets), usable(input.current_liabilities)),
    );
    set.insert_opt(
        RatioName::QuickRatio,
        percent(quick_assets(input), usable(input.current_liabilities)),
    );
    set.insert_opt(
        RatioName::DebtRatio,
        percent(usable(input.total_liabilities), usable(input.equity)),
    );
    set.insert_opt(
        RatioName::EquityRatio,
        percent(usable(input.equity), usable(input.total_assets)),
    );
    set.insert_opt(
        RatioName::InterestCoverage,
        times(usable(input.operating_income), usable(input.interest_expense)),
    );
    set.insert_opt(
        RatioName::OperatingMargin,
        percent(usable(input.operating_income), usable(input.sales)),
    );
    set.insert_opt(
        RatioName::NetMargin,
        percent(usable(input.net_income), usable(input.sales)),
    );
    set.insert_opt(
        RatioName::Roa,
        percent(usable(input.net_income), usable(input.total_assets)),
    );
    set.insert_opt(
        RatioName::Roe,
        percent(usable(input.net_income), usable(input.equity)),
    );
    set.insert_opt(
        RatioName::AssetTurnover,
        times(usable(input.sales), usable(input.total_assets)),
    );
    set.insert_opt(
        RatioName::InventoryTurnover,
        times(usable(input.sales), usable(input.inventory)),
    );
    set.insert_opt(
        RatioName::ReceivableTurnover,
        times(usable(input.sales), usable(input.receivables)),
    );

    set
}
