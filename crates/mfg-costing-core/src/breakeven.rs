use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::types::{percent_of, with_metadata, ComputationOutput, Money, Percent, Viability};

/// Target profits swept on every analysis, as a percentage of fixed costs.
pub const BASE_PROFIT_TARGETS: [Decimal; 8] = [
    dec!(0),
    dec!(5),
    dec!(10),
    dec!(15),
    dec!(20),
    dec!(25),
    dec!(30),
    dec!(50),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for break-even analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEvenInput {
    /// Total fixed costs for the period
    #[serde(default)]
    pub fixed_costs: Money,
    /// Selling price per unit
    #[serde(default)]
    pub selling_price: Money,
    /// Variable cost per unit, usually the cost sheet's cost per unit
    #[serde(default)]
    pub variable_cost_per_unit: Money,
}

impl BreakEvenInput {
    /// Price - variable cost per unit
    pub fn contribution_margin(&self) -> Money {
        self.selling_price.saturating_sub(self.variable_cost_per_unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub contribution_margin: Money,
    /// CM / price, in percent
    pub contribution_ratio: Percent,
    /// ceil(FC / CM); not viable when CM <= 0 or the figures overflow
    pub break_even_units: Viability<Decimal>,
    /// break_even_units * price
    pub break_even_sales: Viability<Money>,
}

/// Units and sales needed to earn a target profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitScenario {
    /// Target profit as a percentage of fixed costs
    pub target_profit_pct: Percent,
    pub target_profit_amount: Money,
    pub units_to_sell: Viability<Decimal>,
    pub total_sales: Viability<Money>,
    /// units * CM - FC; zero when the target is not viable
    pub total_profit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenAnalysisInput {
    #[serde(flatten)]
    pub base: BreakEvenInput,
    /// Extra target profit percentage to add to the sweep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_target_profit_pct: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenOutput {
    #[serde(flatten)]
    pub break_even: BreakEvenResult,
    pub scenarios: Vec<ProfitScenario>,
    /// Largest viable unit count across scenarios, at least 1
    pub max_units_to_sell: Decimal,
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

pub fn break_even(input: &BreakEvenInput) -> BreakEvenResult {
    let contribution_margin = input.contribution_margin();

    let contribution_ratio = if input.selling_price <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        percent_of(contribution_margin, input.selling_price)
    };

    let reached = units_needed(input.fixed_costs, contribution_margin)
        .and_then(|u| Some((u, u.checked_mul(input.selling_price)?)));

    BreakEvenResult {
        contribution_margin,
        contribution_ratio,
        break_even_units: reached.map(|(u, _)| u),
        break_even_sales: reached.map(|(_, sales)| sales),
    }
}

/// Base targets plus an optional custom one, ascending and without duplicates.
///
/// A custom target of zero or less is ignored.
pub fn profit_targets(custom: Option<Percent>) -> Vec<Percent> {
    let mut targets = BASE_PROFIT_TARGETS.to_vec();
    if let Some(c) = custom {
        if c > Decimal::ZERO && !targets.contains(&c) {
            targets.push(c);
            targets.sort();
        }
    }
    targets
}

pub fn profit_scenarios(input: &BreakEvenInput, targets: &[Percent]) -> Vec<ProfitScenario> {
    let cm = input.contribution_margin();
    targets
        .iter()
        .map(|&pct| {
            let target_profit_amount = (pct / dec!(100)).saturating_mul(input.fixed_costs);
            // Units, sales and profit are reported together or not at all
            let reached = match input.fixed_costs.checked_add(target_profit_amount) {
                Some(needed) => units_needed(needed, cm),
                None => Viability::NotViable,
            }
            .and_then(|u| {
                let sales = u.checked_mul(input.selling_price)?;
                let profit = u.checked_mul(cm)?.checked_sub(input.fixed_costs)?;
                Some((u, sales, profit))
            });
            ProfitScenario {
                target_profit_pct: pct,
                target_profit_amount,
                units_to_sell: reached.map(|(u, _, _)| u),
                total_sales: reached.map(|(_, sales, _)| sales),
                total_profit: reached.map(|(_, _, profit)| profit).unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

/// ceil(amount / CM), not viable when CM <= 0 or the quotient overflows.
fn units_needed(amount: Money, contribution_margin: Money) -> Viability<Decimal> {
    if contribution_margin <= Decimal::ZERO {
        return Viability::NotViable;
    }
    match amount.checked_div(contribution_margin) {
        Some(units) => Viability::Viable(units.ceil()),
        None => Viability::NotViable,
    }
}

// ---------------------------------------------------------------------------
// Function: analyze_break_even
// ---------------------------------------------------------------------------

/// Compute the break-even point and the units and sales needed for each
/// target profit in the sweep.
pub fn analyze_break_even(input: &BreakEvenAnalysisInput) -> ComputationOutput<BreakEvenOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = break_even(&input.base);
    if result.contribution_margin <= Decimal::ZERO {
        warn!(
            contribution_margin = %result.contribution_margin,
            "contribution margin is not positive; break-even unreachable"
        );
        warnings.push(
            "Contribution margin is zero or negative; break-even is not viable at this price"
                .to_string(),
        );
    }
    if input.base.selling_price <= Decimal::ZERO {
        warnings.push("Selling price is zero or negative; contribution ratio reported as 0".to_string());
    }

    let targets = profit_targets(input.custom_target_profit_pct);
    let scenarios = profit_scenarios(&input.base, &targets);

    if result.contribution_margin > Decimal::ZERO {
        let overflowed = scenarios
            .iter()
            .filter(|s| !s.units_to_sell.is_viable())
            .count()
            + usize::from(!result.break_even_units.is_viable());
        if overflowed > 0 {
            warn!(
                contribution_margin = %result.contribution_margin,
                overflowed,
                "break-even figures exceed the representable range"
            );
            warnings.push(format!(
                "{} break-even figure(s) exceed the largest representable amount; reported as not viable",
                overflowed
            ));
        }
    }

    let max_units_to_sell = scenarios
        .iter()
        .filter_map(|s| s.units_to_sell.value())
        .fold(dec!(1), Decimal::max);

    debug!(
        contribution_margin = %result.contribution_margin,
        viable = result.break_even_units.is_viable(),
        scenarios = scenarios.len(),
        "break-even analysed"
    );

    let output = BreakEvenOutput {
        break_even: result,
        scenarios,
        max_units_to_sell,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Break-even Analysis with Target Profit Scenarios",
        &serde_json::json!({
            "fixed_costs": input.base.fixed_costs.to_string(),
            "selling_price": input.base.selling_price.to_string(),
            "variable_cost_per_unit": input.base.variable_cost_per_unit.to_string(),
            "custom_target_profit_pct": input.custom_target_profit_pct.map(|p| p.to_string()),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
