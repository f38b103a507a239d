use serde_json::Value;

use super::format_scalar;

/// Key answer per command, in order of priority.
const PRIORITY_KEYS: [&str; 7] = [
    "selling_price",
    "cost_per_unit",
    "break_even_units",
    "total_cost_value",
    "sheet_number",
    "formatted",
    "valid",
];

/// Print just the key answer value from the output.
///
/// The currency-formatted `display` figure is preferred when the command
/// produced one. Falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let display = value.as_object().and_then(|m| m.get("display"));

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = display.and_then(|d| d.get(key)).or_else(|| map.get(key)) {
                if !val.is_null() {
                    return format_scalar(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_preferred_over_raw() {
        let v = json!({
            "result": {"cost_per_unit": "100", "total_cost": "10000"},
            "display": {"cost_per_unit": "₹100.00"},
        });
        assert_eq!(minimal_answer(&v), "₹100.00");
    }

    #[test]
    fn test_break_even_units_without_selling_price() {
        let v = json!({"result": {"break_even_units": {"viable": "250"}, "contribution_margin": "40"}});
        assert_eq!(minimal_answer(&v), "250");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let v = json!({"result": {"alpha": "1"}});
        assert_eq!(minimal_answer(&v), "alpha: 1");
    }
}
