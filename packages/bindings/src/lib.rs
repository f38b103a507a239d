use napi::Result as NapiResult;
use napi_derive::napi;

use mfg_costing_core::cost_sheet::{self, CostComponents, CostSheetInput};
use mfg_costing_core::reports::{self, CostSheetSummary};
use mfg_costing_core::sanitize::{amount_from_f64, parse_amount};
use mfg_costing_core::{breakeven, formatting, pricing, records, Currency, Quantity};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Cost sheets
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_cost_sheet(input_json: String) -> NapiResult<String> {
    let input: CostSheetInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cost_sheet::analyze_cost_sheet(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Flat aggregation for form screens that hold plain JS numbers.
/// NaN and infinities count as zero; a missing or non-positive quantity as one.
#[napi]
pub fn aggregate_costs(
    material_cost: f64,
    labor_cost: f64,
    overhead_cost: f64,
    other_costs: f64,
    quantity_produced: Option<i64>,
) -> NapiResult<String> {
    let components = CostComponents::flat(
        amount_from_f64(material_cost),
        amount_from_f64(labor_cost),
        amount_from_f64(overhead_cost),
        amount_from_f64(other_costs),
    );
    let result = cost_sheet::aggregate(&components, Quantity::from_optional(quantity_produced));
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing and break-even
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_price(input_json: String) -> NapiResult<String> {
    let input: pricing::PricingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pricing::analyze_pricing(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_break_even(input_json: String) -> NapiResult<String> {
    let input: breakeven::BreakEvenAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = breakeven::analyze_break_even(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reports and records
// ---------------------------------------------------------------------------

#[napi]
pub fn summarize_cost_sheets(input_json: String) -> NapiResult<String> {
    let sheets: Vec<CostSheetSummary> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = reports::summarize_cost_sheets(&sheets);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn next_sheet_number(existing_count: u32) -> String {
    records::next_sheet_number(u64::from(existing_count))
}

/// `amount` is the decimal as text so no precision is lost crossing into JS.
#[napi]
pub fn format_money(amount: String, currency: Option<String>) -> String {
    let currency = currency.map(Currency::from).unwrap_or_default();
    formatting::format_money(parse_amount(&amount), &currency)
}
