use serde_json::Value;

use super::cell;

/// Headline figures in order of priority. Dotted keys reach into nested
/// objects.
const PRIORITY_KEYS: &[&str] = &[
    "economy",
    "payment",
    "ranking.highest_npv",
    "npv",
    "irr",
    "self_financed.summary.profit",
    "overall.default_free_ratio",
    "credit_released",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = lookup(result, key) {
                if !val.is_null() {
                    println!("{}", cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    println!("{}", cell(result));
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}
