pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a JSON scalar for a table cell or CSV field.
///
/// Viability markers read as people expect: `{"viable": "250"}` as `250`,
/// `"not_viable"` as `Not viable`.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s == "not_viable" => mfg_costing_core::formatting::NOT_VIABLE_LABEL.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) if map.len() == 1 && map.contains_key("viable") => {
            map.get("viable").map(format_scalar).unwrap_or_default()
        }
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
