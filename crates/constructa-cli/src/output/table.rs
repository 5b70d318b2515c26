use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, is_record_list};

/// Format output as tables. Scalar fields go in a field/value table, arrays
/// of records (schedules, monthly rows) each get a table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => {
                print_section(None, result);
                print_envelope_notes(map);
            }
            None => print_section(None, value),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", value),
    }
}

fn print_section(title: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(title) = title {
                println!("\n{}", title);
            }
            print_fields(map);
            for (key, val) in map {
                let label = title.map_or_else(|| key.clone(), |t| format!("{}.{}", t, key));
                match val {
                    Value::Array(arr) if is_record_list(val) => {
                        println!("\n{}", label);
                        print_records(arr);
                    }
                    Value::Object(inner) if inner.values().any(is_record_list) => {
                        print_section(Some(label.as_str()), val);
                    }
                    _ => {}
                }
            }
        }
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", cell(value)),
    }
}

/// Field/value table of everything that is not a record list.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut rows = 0;
    for (key, val) in map {
        let nested_records =
            matches!(val, Value::Object(inner) if inner.values().any(is_record_list));
        if is_record_list(val) || nested_records {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
        rows += 1;
    }
    if rows > 0 {
        println!("{}", Table::from(builder));
    }
}

fn print_records(arr: &[Value]) {
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
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", cell(item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
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
