use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use mfg_costing_core::breakeven::{self, BreakEvenAnalysisInput, BreakEvenInput};
use mfg_costing_core::formatting::{format_money, format_percent, format_viable};
use mfg_costing_core::pricing::suggested_selling_price;
use mfg_costing_core::sanitize::parse_percent;

use crate::commands::attach_display;
use crate::{input, Context};

/// Arguments for break-even analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BreakEvenArgs {
    /// Total fixed costs for the period
    #[arg(long)]
    pub fixed_costs: Option<Decimal>,

    /// Selling price per unit (defaults to variable cost plus 30%)
    #[arg(long)]
    pub selling_price: Option<Decimal>,

    /// Variable cost per unit, usually the cost sheet's cost per unit
    #[arg(long)]
    pub variable_cost: Option<Decimal>,

    /// Extra target profit percentage to include in the sweep. An empty
    /// value clears the configured default
    #[arg(long)]
    pub custom_target: Option<String>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl BreakEvenArgs {
    pub fn to_input(&self, default_custom: Option<Decimal>) -> Result<BreakEvenAnalysisInput, Box<dyn std::error::Error>> {
        let fixed_costs = self
            .fixed_costs
            .ok_or("--fixed-costs is required (or provide --input)")?;
        let variable_cost_per_unit = self
            .variable_cost
            .ok_or("--variable-cost is required (or provide --input)")?;
        let selling_price = match self.selling_price {
            Some(p) => p,
            None => {
                let p = suggested_selling_price(variable_cost_per_unit);
                info!(selling_price = %p, "no selling price given; using variable cost plus 30%");
                p
            }
        };
        let custom_target_profit_pct = match &self.custom_target {
            Some(raw) => parse_percent(raw),
            None => default_custom,
        };
        Ok(BreakEvenAnalysisInput {
            base: BreakEvenInput {
                fixed_costs,
                selling_price,
                variable_cost_per_unit,
            },
            custom_target_profit_pct,
        })
    }
}

/// File input wins over flags. The configured custom target fills in only
/// when neither the file nor the `--custom-target` flag set one.
fn resolve_input(
    args: &BreakEvenArgs,
    from_file: Option<BreakEvenAnalysisInput>,
    default_custom: Option<Decimal>,
) -> Result<BreakEvenAnalysisInput, Box<dyn std::error::Error>> {
    match from_file {
        Some(mut parsed) => {
            if parsed.custom_target_profit_pct.is_none() {
                parsed.custom_target_profit_pct = default_custom;
            }
            Ok(parsed)
        }
        None => args.to_input(default_custom),
    }
}

pub fn run_break_even(args: BreakEvenArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let from_file = input::read_input(args.input.as_deref())?;
    let be_input = resolve_input(&args, from_file, ctx.config.custom_target_profit_pct)?;

    let output = breakeven::analyze_break_even(&be_input);

    let r = &output.result.break_even;
    let money = |v: Decimal| format_money(v, &ctx.currency);
    let display = vec![
        ("contribution_margin", money(r.contribution_margin)),
        ("contribution_ratio", format_percent(r.contribution_ratio)),
        ("break_even_units", format_viable(&r.break_even_units, |u| format!("{} units", u))),
        ("break_even_sales", format_viable(&r.break_even_sales, money)),
    ];
    Ok(attach_display(serde_json::to_value(output)?, display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> BreakEvenArgs {
        BreakEvenArgs {
            fixed_costs: Some(dec!(10000)),
            selling_price: None,
            variable_cost: Some(dec!(60)),
            custom_target: None,
            input: None,
        }
    }

    #[test]
    fn test_price_defaults_to_suggested() {
        let input = args().to_input(None).unwrap();
        assert_eq!(input.base.selling_price, dec!(78));
    }

    #[test]
    fn test_custom_target_flag_beats_config() {
        let a = BreakEvenArgs {
            custom_target: Some("35".to_string()),
            ..args()
        };
        assert_eq!(a.to_input(Some(dec!(12))).unwrap().custom_target_profit_pct, Some(dec!(35)));
        assert_eq!(args().to_input(Some(dec!(12))).unwrap().custom_target_profit_pct, Some(dec!(12)));
    }

    #[test]
    fn test_blank_custom_target_is_none() {
        let a = BreakEvenArgs {
            custom_target: Some(String::new()),
            ..args()
        };
        assert_eq!(a.to_input(None).unwrap().custom_target_profit_pct, None);
    }

    #[test]
    fn test_blank_custom_target_clears_configured_default() {
        let a = BreakEvenArgs {
            custom_target: Some(String::new()),
            ..args()
        };
        let resolved = resolve_input(&a, None, Some(dec!(12))).unwrap();
        assert_eq!(resolved.custom_target_profit_pct, None);
        let resolved = resolve_input(&args(), None, Some(dec!(12))).unwrap();
        assert_eq!(resolved.custom_target_profit_pct, Some(dec!(12)));
    }

    #[test]
    fn test_file_input_takes_configured_default_only_when_unset() {
        let from_file = |custom: Option<Decimal>| BreakEvenAnalysisInput {
            base: BreakEvenInput {
                fixed_costs: dec!(500),
                selling_price: dec!(20),
                variable_cost_per_unit: dec!(15),
            },
            custom_target_profit_pct: custom,
        };
        let resolved = resolve_input(&args(), Some(from_file(None)), Some(dec!(12))).unwrap();
        assert_eq!(resolved.custom_target_profit_pct, Some(dec!(12)));
        assert_eq!(resolved.base.fixed_costs, dec!(500));
        let resolved = resolve_input(&args(), Some(from_file(Some(dec!(40)))), Some(dec!(12))).unwrap();
        assert_eq!(resolved.custom_target_profit_pct, Some(dec!(40)));
    }
}
