use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use mfg_costing_core::formatting::format_money;
use mfg_costing_core::reports::{self, CostSheetSummary};

use crate::commands::attach_display;
use crate::{input, Context};

/// Arguments for the cost sheet report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to a JSON or YAML list of saved cost sheets
    #[arg(long)]
    pub input: Option<String>,
}

/// Either a bare list of sheets or `{ "sheets": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReportInput {
    List(Vec<CostSheetSummary>),
    Wrapped { sheets: Vec<CostSheetSummary> },
}

impl ReportInput {
    fn into_sheets(self) -> Vec<CostSheetSummary> {
        match self {
            ReportInput::List(sheets) | ReportInput::Wrapped { sheets } => sheets,
        }
    }
}

pub fn run_report(args: ReportArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let sheets = match input::read_input::<ReportInput>(args.input.as_deref())? {
        Some(parsed) => parsed.into_sheets(),
        None => return Err("--input <sheets.json> or stdin required for the cost report".into()),
    };
    let output = reports::summarize_cost_sheets(&sheets);

    let r = &output.result;
    let display = vec![
        ("total_cost_value", format_money(r.total_cost_value, &ctx.currency)),
        ("average_cost_per_unit", format_money(r.average_cost_per_unit, &ctx.currency)),
        ("grand_total", format_money(r.grand_total, &ctx.currency)),
    ];
    Ok(attach_display(serde_json::to_value(output)?, display))
}
