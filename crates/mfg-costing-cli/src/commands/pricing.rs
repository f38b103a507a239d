use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use mfg_costing_core::formatting::{format_money, format_percent};
use mfg_costing_core::pricing::{self, PricingInput, PricingMethod, ProfitTarget};

use crate::commands::attach_display;
use crate::{input, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Cost plus a markup percentage
    CostPlus,
    /// Desired profit as a margin on selling price
    DesiredMargin,
    /// Desired profit as an absolute amount per unit
    DesiredAmount,
    /// Match a competitor's price
    Market,
}

/// Arguments for unit pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PricingArgs {
    /// Cost per unit, usually from a cost sheet
    #[arg(long)]
    pub cost_per_unit: Option<Decimal>,

    /// Pricing method
    #[arg(long, value_enum, default_value = "cost-plus")]
    pub method: MethodArg,

    /// Markup on cost in percent (cost plus)
    #[arg(long)]
    pub markup: Option<Decimal>,

    /// Margin on selling price in percent (desired margin)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Profit per unit (desired amount)
    #[arg(long)]
    pub profit_amount: Option<Decimal>,

    /// Competitor's price per unit (market)
    #[arg(long)]
    pub competitor_price: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl PricingArgs {
    pub fn to_input(&self) -> Result<PricingInput, Box<dyn std::error::Error>> {
        let cost_per_unit = self
            .cost_per_unit
            .ok_or("--cost-per-unit is required (or provide --input)")?;
        let method = match self.method {
            MethodArg::CostPlus => PricingMethod::CostPlus {
                markup_pct: self.markup.ok_or("--markup is required for cost-plus pricing")?,
            },
            MethodArg::DesiredMargin => PricingMethod::DesiredProfit {
                target: ProfitTarget::MarginPct(
                    self.margin.ok_or("--margin is required for desired-margin pricing")?,
                ),
            },
            MethodArg::DesiredAmount => PricingMethod::DesiredProfit {
                target: ProfitTarget::ProfitAmount(
                    self.profit_amount
                        .ok_or("--profit-amount is required for desired-amount pricing")?,
                ),
            },
            MethodArg::Market => PricingMethod::MarketBasis {
                competitor_price: self
                    .competitor_price
                    .ok_or("--competitor-price is required for market pricing")?,
            },
        };
        Ok(PricingInput {
            cost_per_unit,
            method,
        })
    }
}

pub fn run_pricing(args: PricingArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing_input: PricingInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => args.to_input()?,
    };
    let output = pricing::analyze_pricing(&pricing_input);

    let r = &output.result;
    let mut display = vec![
        ("cost_per_unit", format_money(r.cost_per_unit, &ctx.currency)),
        ("selling_price", format_money(r.pricing.selling_price, &ctx.currency)),
        ("profit_per_unit", format_money(r.pricing.profit_per_unit, &ctx.currency)),
        ("margin_pct", format_percent(r.pricing.margin_pct)),
        ("markup_pct", format_percent(r.pricing.markup_pct)),
    ];
    if let Some(eq) = r.equivalent_margin_pct {
        display.push(("equivalent_margin_pct", format_percent(eq)));
    }
    Ok(attach_display(serde_json::to_value(output)?, display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(method: MethodArg) -> PricingArgs {
        PricingArgs {
            cost_per_unit: Some(dec!(50)),
            method,
            markup: None,
            margin: None,
            profit_amount: None,
            competitor_price: None,
            input: None,
        }
    }

    #[test]
    fn test_cost_plus_from_flags() {
        let a = PricingArgs {
            markup: Some(dec!(30)),
            ..args(MethodArg::CostPlus)
        };
        let input = a.to_input().unwrap();
        assert_eq!(pricing::price(&input.method, input.cost_per_unit).selling_price, dec!(65));
    }

    #[test]
    fn test_method_parameter_required() {
        let err = args(MethodArg::DesiredMargin).to_input().unwrap_err();
        assert!(err.to_string().contains("--margin"));
    }

    #[test]
    fn test_market_from_flags() {
        let a = PricingArgs {
            competitor_price: Some(dec!(58)),
            ..args(MethodArg::Market)
        };
        assert_eq!(
            a.to_input().unwrap().method,
            PricingMethod::MarketBasis {
                competitor_price: dec!(58)
            }
        );
    }
}
