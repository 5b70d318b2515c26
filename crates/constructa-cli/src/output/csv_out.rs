use serde_json::{Map, Value};
use std::io;

use super::{cell, is_record_list};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// The first record list found (the schedule or the monthly rows) is written
/// as a table; without one, the result is written as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };

    match body {
        Value::Array(arr) => write_records(&mut wtr, arr),
        Value::Object(map) => match find_records(map) {
            Some(records) => write_records(&mut wtr, records),
            None => write_fields(&mut wtr, map),
        },
        _ => {
            let _ = wtr.write_record([cell(body)]);
        }
    }

    let _ = wtr.flush();
}

/// Depth-first search for the first array of records.
fn find_records(map: &Map<String, Value>) -> Option<&[Value]> {
    for val in map.values() {
        match val {
            Value::Array(arr) if is_record_list(val) => return Some(arr),
            Value::Object(inner) => {
                if let Some(found) = find_records(inner) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn write_fields(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &cell(val)]);
    }
}

fn write_records(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
