pub mod break_even;
pub mod cost_sheet;
pub mod format;
pub mod pricing;
pub mod records;
pub mod report;

use serde_json::{Map, Value};

/// Attach currency-formatted figures to an output envelope under `display`.
///
/// The `result` section keeps the exact decimals; `display` is for people.
pub fn attach_display(mut envelope: Value, display: Vec<(&str, String)>) -> Value {
    if let Value::Object(map) = &mut envelope {
        let rendered: Map<String, Value> = display
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v)))
            .collect();
        map.insert("display".to_string(), Value::Object(rendered));
    }
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attach_display_keeps_result() {
        let v = attach_display(json!({"result": {"x": "1"}}), vec![("x", "₹1.00".to_string())]);
        assert_eq!(v["result"]["x"], "1");
        assert_eq!(v["display"]["x"], "₹1.00");
    }
}
