use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use mfg_costing_core::records::{self, CostSheetRecord, PricingDecisionRecord, Product};

use crate::input;

/// Arguments for sheet numbering
#[derive(Args)]
pub struct SheetNumberArgs {
    /// Number of cost sheets already saved
    #[arg(long, default_value = "0")]
    pub existing_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Product,
    CostSheet,
    PricingDecision,
}

/// Arguments for record validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Which record the input holds
    #[arg(long, value_enum)]
    pub kind: RecordKind,

    /// Path to JSON or YAML record
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sheet_number(args: SheetNumberArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "result": {
            "sheet_number": records::next_sheet_number(args.existing_count),
            "existing_count": args.existing_count,
        }
    }))
}

fn read_record<T: serde::de::DeserializeOwned>(path: Option<&str>) -> Result<T, Box<dyn std::error::Error>> {
    input::read_input(path)?.ok_or_else(|| "--input <record.json> or stdin required for validation".into())
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let path = args.input.as_deref();
    let record = match args.kind {
        RecordKind::Product => {
            let r: Product = read_record(path)?;
            r.validate()?;
            serde_json::to_value(r)?
        }
        RecordKind::CostSheet => {
            let r: CostSheetRecord = read_record(path)?;
            r.validate()?;
            serde_json::to_value(r)?
        }
        RecordKind::PricingDecision => {
            let r: PricingDecisionRecord = read_record(path)?;
            r.validate()?;
            serde_json::to_value(r)?
        }
    };
    Ok(json!({ "result": { "valid": true, "record": record } }))
}
