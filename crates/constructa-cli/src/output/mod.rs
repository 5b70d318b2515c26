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

/// Render a leaf value for a table cell or CSV field.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) => match (map.get("status"), map.len()) {
            // Tagged outcome such as {"status": "defined", "rate": "0.01"}
            (Some(Value::String(status)), 1) => status.replace('_', " "),
            (Some(Value::String(_)), 2) => map
                .iter()
                .find(|(k, _)| k.as_str() != "status")
                .map(|(_, v)| cell(v))
                .unwrap_or_default(),
            _ => serde_json::to_string(value).unwrap_or_default(),
        },
        Value::Array(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// True for a non-empty array whose first element is an object.
pub(crate) fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))))
}
