use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_scalar;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else {
                print_field_table(&field_rows(map, ""));
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        println!("{}", format_scalar(result));
        return;
    };

    print_field_table(&field_rows(res_map, ""));

    // Lists such as scenarios or per-product rollups get their own table
    for (key, val) in res_map {
        if let Value::Array(arr) = val {
            if arr.iter().any(Value::is_object) {
                println!("\n{}:", title(key));
                print_array_table(arr);
            }
        }
    }

    if let Some(Value::Object(display)) = envelope.get("display") {
        println!("\nDisplay:");
        print_field_table(&field_rows(display, ""));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Flatten nested objects into dotted field names, skipping object lists.
fn field_rows(map: &Map<String, Value>, prefix: &str) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) if !(inner.len() == 1 && inner.contains_key("viable")) => {
                rows.extend(field_rows(inner, &name));
            }
            Value::Array(arr) if arr.iter().any(Value::is_object) => {}
            _ => rows.push((name, format_scalar(val))),
        }
    }
    rows
}

fn print_field_table(rows: &[(String, String)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows {
        builder.push_record([field.as_str(), value.as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
    }
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
