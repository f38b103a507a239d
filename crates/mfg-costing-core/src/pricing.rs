use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::types::{
    is_saturated, percent_of, saturated, with_metadata, ComputationOutput, Money, Percent,
};

/// Desired margins at or above 100% price at this multiple of cost.
pub const MARGIN_CAP_MULTIPLE: Decimal = dec!(10);

/// Default markup applied when a price is pre-filled from a cost sheet.
pub const SUGGESTED_MARKUP_FACTOR: Decimal = dec!(1.3);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the seller wants to earn per unit under the desired-profit method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitTarget {
    /// Profit as a percentage of selling price
    MarginPct(Percent),
    /// Absolute profit per unit
    ProfitAmount(Money),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PricingMethod {
    CostPlus { markup_pct: Percent },
    DesiredProfit { target: ProfitTarget },
    /// Competitor price taken as-is; kept to record where the price came from
    MarketBasis { competitor_price: Money },
}

impl PricingMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PricingMethod::CostPlus { .. } => "Cost Plus",
            PricingMethod::DesiredProfit { .. } => "Desired Profit",
            PricingMethod::MarketBasis { .. } => "Market Basis",
        }
    }

    /// Storage tag, e.g. `cost_plus`.
    pub fn tag(&self) -> &'static str {
        match self {
            PricingMethod::CostPlus { .. } => "cost_plus",
            PricingMethod::DesiredProfit { .. } => "desired_profit",
            PricingMethod::MarketBasis { .. } => "market_basis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub selling_price: Money,
    /// May be negative when the price is below cost
    pub profit_per_unit: Money,
    /// Profit / selling price, in percent
    pub margin_pct: Percent,
    /// Profit / cost, in percent
    pub markup_pct: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInput {
    pub cost_per_unit: Money,
    #[serde(flatten)]
    pub method: PricingMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingOutput {
    pub method_label: String,
    pub method: PricingMethod,
    pub cost_per_unit: Money,
    #[serde(flatten)]
    pub pricing: PricingResult,
    /// Margin implied by an absolute profit target, for display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_margin_pct: Option<Percent>,
    pub margin_capped: bool,
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Selling price for a method, before any derived metrics. Prices beyond
/// the representable range are clipped to it.
pub fn selling_price(method: &PricingMethod, cost_per_unit: Money) -> Money {
    match method {
        PricingMethod::CostPlus { markup_pct } => {
            cost_per_unit.saturating_mul(dec!(1) + *markup_pct / dec!(100))
        }
        PricingMethod::DesiredProfit {
            target: ProfitTarget::MarginPct(m),
        } => {
            if *m >= dec!(100) {
                cost_per_unit.saturating_mul(MARGIN_CAP_MULTIPLE)
            } else {
                cost_per_unit
                    .checked_div(dec!(1) - *m / dec!(100))
                    .unwrap_or_else(|| saturated(cost_per_unit.is_sign_negative()))
            }
        }
        PricingMethod::DesiredProfit {
            target: ProfitTarget::ProfitAmount(p),
        } => cost_per_unit.saturating_add(*p),
        PricingMethod::MarketBasis { competitor_price } => *competitor_price,
    }
}

/// Profit, margin and markup for an already chosen selling price.
pub fn metrics_for_price(selling_price: Money, cost_per_unit: Money) -> PricingResult {
    let profit_per_unit = selling_price.saturating_sub(cost_per_unit);
    let margin_pct = if selling_price <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        percent_of(profit_per_unit, selling_price)
    };
    let markup_pct = if cost_per_unit <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        percent_of(profit_per_unit, cost_per_unit)
    };
    PricingResult {
        selling_price,
        profit_per_unit,
        margin_pct,
        markup_pct,
    }
}

pub fn price(method: &PricingMethod, cost_per_unit: Money) -> PricingResult {
    metrics_for_price(selling_price(method, cost_per_unit), cost_per_unit)
}

/// p / (cost + p) * 100, zero when that price is not positive.
pub fn equivalent_margin_pct(cost_per_unit: Money, profit_amount: Money) -> Percent {
    let price = cost_per_unit.saturating_add(profit_amount);
    if price <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        percent_of(profit_amount, price)
    }
}

/// Price pre-filled from a unit cost: a 30% markup.
pub fn suggested_selling_price(variable_cost_per_unit: Money) -> Money {
    variable_cost_per_unit.saturating_mul(SUGGESTED_MARKUP_FACTOR)
}

// ---------------------------------------------------------------------------
// Function: analyze_pricing
// ---------------------------------------------------------------------------

/// Price a unit with the chosen method and report profit, margin and markup.
pub fn analyze_pricing(input: &PricingInput) -> ComputationOutput<PricingOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let pricing = price(&input.method, input.cost_per_unit);

    let margin_capped = matches!(
        input.method,
        PricingMethod::DesiredProfit { target: ProfitTarget::MarginPct(m) } if m >= dec!(100)
    );
    if margin_capped {
        warn!(cost_per_unit = %input.cost_per_unit, "desired margin at or above 100%; price capped");
        warnings.push(format!(
            "Desired margin of 100% or more cannot be reached; price capped at {}x cost",
            MARGIN_CAP_MULTIPLE
        ));
    }

    let equivalent_margin_pct = match &input.method {
        PricingMethod::DesiredProfit {
            target: ProfitTarget::ProfitAmount(p),
        } => Some(equivalent_margin_pct(input.cost_per_unit, *p)),
        _ => None,
    };

    if pricing.profit_per_unit < Decimal::ZERO {
        warnings.push(format!(
            "Selling price {} is below cost per unit {}; each unit sold loses money",
            pricing.selling_price, input.cost_per_unit
        ));
    }
    if input.cost_per_unit <= Decimal::ZERO {
        warnings.push("Cost per unit is zero or negative; markup reported as 0".to_string());
    }
    if is_saturated(pricing.selling_price) || is_saturated(pricing.profit_per_unit) {
        warn!(selling_price = %pricing.selling_price, "selling price overflows; clipped");
        warnings.push(
            "Selling price exceeds the largest representable value; figures are clipped to that limit"
                .to_string(),
        );
    }

    debug!(
        method = input.method.tag(),
        selling_price = %pricing.selling_price,
        profit_per_unit = %pricing.profit_per_unit,
        "unit priced"
    );

    let output = PricingOutput {
        method_label: input.method.label().to_string(),
        method: input.method.clone(),
        cost_per_unit: input.cost_per_unit,
        pricing,
        equivalent_margin_pct,
        margin_capped,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Unit Pricing: Cost Plus, Desired Profit or Market Basis",
        &serde_json::json!({
            "method": input.method.tag(),
            "cost_per_unit": input.cost_per_unit.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cost_plus(markup: Decimal) -> PricingMethod {
        PricingMethod::CostPlus { markup_pct: markup }
    }

    fn margin(m: Decimal) -> PricingMethod {
        PricingMethod::DesiredProfit {
            target: ProfitTarget::MarginPct(m),
        }
    }

    #[test]
    fn test_cost_plus_30_pct() {
        let r = price(&cost_plus(dec!(30)), dec!(50));
        assert_eq!(r.selling_price, dec!(65));
        assert_eq!(r.profit_per_unit, dec!(15));
        assert_eq!(r.markup_pct, dec!(30));
        // 15/65 = 23.0769...%
        assert!((r.margin_pct - dec!(23.08)).abs() < dec!(0.01));
    }

    #[test]
    fn test_desired_margin_20_pct() {
        // 80 / (1 - 0.2) = 100
        let r = price(&margin(dec!(20)), dec!(80));
        assert_eq!(r.selling_price, dec!(100));
        assert_eq!(r.margin_pct, dec!(20));
        assert_eq!(r.markup_pct, dec!(25));
    }

    #[test]
    fn test_desired_margin_capped_at_ten_times_cost() {
        assert_eq!(selling_price(&margin(dec!(100)), dec!(50)), dec!(500));
        assert_eq!(selling_price(&margin(dec!(150)), dec!(50)), dec!(500));
    }

    #[test]
    fn test_desired_margin_just_below_cap() {
        // 50 / 0.01 = 5000, well above the cap value: the cap only applies at >= 100
        assert_eq!(selling_price(&margin(dec!(99)), dec!(50)), dec!(5000));
    }

    #[test]
    fn test_desired_profit_amount() {
        let m = PricingMethod::DesiredProfit {
            target: ProfitTarget::ProfitAmount(dec!(25)),
        };
        let r = price(&m, dec!(75));
        assert_eq!(r.selling_price, dec!(100));
        assert_eq!(r.margin_pct, dec!(25));
        assert_eq!(equivalent_margin_pct(dec!(75), dec!(25)), dec!(25));
    }

    #[test]
    fn test_equivalent_margin_zero_price() {
        assert_eq!(equivalent_margin_pct(dec!(10), dec!(-10)), dec!(0));
        assert_eq!(equivalent_margin_pct(dec!(10), dec!(-15)), dec!(0));
    }

    #[test]
    fn test_market_basis_passes_competitor_price() {
        let m = PricingMethod::MarketBasis {
            competitor_price: dec!(42.50),
        };
        let r = price(&m, dec!(30));
        assert_eq!(r.selling_price, dec!(42.50));
        assert_eq!(r.profit_per_unit, dec!(12.50));
    }

    #[test]
    fn test_zero_price_and_cost_give_zero_ratios() {
        let r = metrics_for_price(dec!(0), dec!(0));
        assert_eq!(r.margin_pct, dec!(0));
        assert_eq!(r.markup_pct, dec!(0));
    }

    #[test]
    fn test_price_below_cost_negative_profit() {
        let r = metrics_for_price(dec!(40), dec!(50));
        assert_eq!(r.profit_per_unit, dec!(-10));
        assert_eq!(r.margin_pct, dec!(-25));
        assert_eq!(r.markup_pct, dec!(-20));
    }

    #[test]
    fn test_analyze_pricing_flags_cap() {
        let out = analyze_pricing(&PricingInput {
            cost_per_unit: dec!(20),
            method: margin(dec!(120)),
        });
        assert!(out.result.margin_capped);
        assert_eq!(out.result.pricing.selling_price, dec!(200));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.method_label, "Desired Profit");
    }

    #[test]
    fn test_analyze_pricing_equivalent_margin_only_for_amount() {
        let out = analyze_pricing(&PricingInput {
            cost_per_unit: dec!(20),
            method: cost_plus(dec!(10)),
        });
        assert!(out.result.equivalent_margin_pct.is_none());

        let out = analyze_pricing(&PricingInput {
            cost_per_unit: dec!(60),
            method: PricingMethod::DesiredProfit {
                target: ProfitTarget::ProfitAmount(dec!(40)),
            },
        });
        assert_eq!(out.result.equivalent_margin_pct, Some(dec!(40)));
    }

    #[test]
    fn test_pricing_input_flattened_json() {
        let input: PricingInput = serde_json::from_str(
            r#"{"cost_per_unit": "50", "method": "cost_plus", "markup_pct": "30"}"#,
        )
        .unwrap();
        assert_eq!(input.method, cost_plus(dec!(30)));

        let input: PricingInput = serde_json::from_str(
            r#"{"cost_per_unit": "50", "method": "desired_profit", "target": {"profit_amount": "5"}}"#,
        )
        .unwrap();
        assert_eq!(selling_price(&input.method, input.cost_per_unit), dec!(55));
    }

    #[test]
    fn test_suggested_selling_price() {
        assert_eq!(suggested_selling_price(dec!(100)), dec!(130));
    }
}
