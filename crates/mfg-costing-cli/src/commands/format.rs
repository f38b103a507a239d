use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use mfg_costing_core::formatting::{format_money, format_percent, round_money};
use mfg_costing_core::sanitize::parse_amount;

use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatKind {
    Money,
    Percent,
}

/// Arguments for display formatting
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FormatArgs {
    /// Amount as typed; non-numeric text reads as zero
    #[arg(long)]
    pub amount: String,

    #[arg(long, value_enum, default_value = "money")]
    pub kind: FormatKind,
}

pub fn run_format(args: FormatArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let value = parse_amount(&args.amount);
    let formatted = match args.kind {
        FormatKind::Money => format_money(value, &ctx.currency),
        FormatKind::Percent => format_percent(value),
    };
    Ok(json!({
        "result": {
            "formatted": formatted,
            "rounded": round_money(value).to_string(),
            "currency": ctx.currency.code(),
        }
    }))
}
