use clap::Args;
use serde_json::Value;

use mfg_costing_core::cost_sheet::{
    self, CostSheetInput, LaborLine, MaterialConsumption, MaterialsInput, OverheadBreakdown,
};
use mfg_costing_core::formatting::{format_money, format_percent};
use mfg_costing_core::sanitize::{parse_amount, parse_quantity_raw};

use crate::commands::attach_display;
use crate::{input, Context};

/// Arguments for a cost sheet.
///
/// Amount flags take free text the way the cost sheet form does: blank or
/// non-numeric reads as zero, and quantity reads as one.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostSheetArgs {
    /// Product name shown on the sheet
    #[arg(long)]
    pub product_name: Option<String>,

    /// Units produced in the run
    #[arg(long)]
    pub quantity: Option<String>,

    /// Direct material cost, entered flat
    #[arg(long)]
    pub material_cost: Option<String>,

    /// Opening stock of materials (switches to stock-movement materials)
    #[arg(long)]
    pub opening_stock: Option<String>,

    /// Material purchases in the period
    #[arg(long)]
    pub purchases: Option<String>,

    /// Carriage inward on purchases
    #[arg(long)]
    pub carriage_inward: Option<String>,

    /// Closing stock of materials
    #[arg(long)]
    pub closing_stock: Option<String>,

    /// Material lost as scrap
    #[arg(long)]
    pub scrap: Option<String>,

    /// Direct labor hours
    #[arg(long)]
    pub labor_hours: Option<String>,

    /// Direct labor rate per hour
    #[arg(long)]
    pub labor_rate: Option<String>,

    /// Factory overhead
    #[arg(long)]
    pub factory_overhead: Option<String>,

    /// Utilities
    #[arg(long)]
    pub utilities: Option<String>,

    /// Depreciation of plant and machinery
    #[arg(long)]
    pub depreciation: Option<String>,

    /// Other costs (packaging, freight out, ...)
    #[arg(long)]
    pub other_costs: Option<String>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn amount(raw: &Option<String>) -> rust_decimal::Decimal {
    parse_amount(raw.as_deref().unwrap_or(""))
}

impl CostSheetArgs {
    fn uses_stock_movement(&self) -> bool {
        [
            &self.opening_stock,
            &self.purchases,
            &self.carriage_inward,
            &self.closing_stock,
            &self.scrap,
        ]
        .iter()
        .any(|f| f.is_some())
    }

    pub fn to_input(&self) -> CostSheetInput {
        let materials = if self.uses_stock_movement() {
            MaterialsInput::StockMovement(MaterialConsumption {
                opening_stock: amount(&self.opening_stock),
                purchases: amount(&self.purchases),
                carriage_inward: amount(&self.carriage_inward),
                closing_stock: amount(&self.closing_stock),
                scrap: amount(&self.scrap),
            })
        } else {
            MaterialsInput::Flat {
                material_cost: amount(&self.material_cost),
            }
        };

        let labor = if self.labor_hours.is_some() || self.labor_rate.is_some() {
            vec![LaborLine {
                description: "Direct labor".to_string(),
                hours: amount(&self.labor_hours),
                rate: amount(&self.labor_rate),
            }]
        } else {
            Vec::new()
        };

        // Flooring to one is left to the engine so it can warn about it
        let quantity_produced = self.quantity.as_deref().and_then(parse_quantity_raw);

        CostSheetInput {
            product_name: self.product_name.clone(),
            quantity_produced,
            materials,
            labor,
            overhead: OverheadBreakdown {
                factory_overhead: amount(&self.factory_overhead),
                utilities: amount(&self.utilities),
                depreciation: amount(&self.depreciation),
            },
            other_costs: amount(&self.other_costs),
        }
    }
}

pub fn run_cost_sheet(args: CostSheetArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let sheet_input: CostSheetInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => args.to_input(),
    };
    let output = cost_sheet::analyze_cost_sheet(&sheet_input);

    let r = &output.result;
    let display = vec![
        ("material_cost", format_money(r.components.material_cost, &ctx.currency)),
        ("labor_cost", format_money(r.components.labor_cost, &ctx.currency)),
        ("overhead_cost", format_money(r.components.overhead_cost, &ctx.currency)),
        ("other_costs", format_money(r.components.other_costs, &ctx.currency)),
        ("prime_cost", format_money(r.prime_cost, &ctx.currency)),
        ("factory_cost", format_money(r.factory_cost, &ctx.currency)),
        ("total_cost", format_money(r.total_cost, &ctx.currency)),
        ("cost_per_unit", format_money(r.cost_per_unit, &ctx.currency)),
        ("material_pct", format_percent(r.breakdown.material_pct)),
        ("labor_pct", format_percent(r.breakdown.labor_pct)),
        ("overhead_pct", format_percent(r.breakdown.overhead_pct)),
        ("other_pct", format_percent(r.breakdown.other_pct)),
    ];
    Ok(attach_display(serde_json::to_value(output)?, display))
}
