use serde_json::Value;

use super::format_value;

/// Headline figure of each command, by dotted path within `result`.
const PRIORITY_PATHS: [&str; 6] = [
    "final_value",
    "comparison.gap_pct",
    "mean_predicted_return_pct",
    "best_strategy",
    "metrics.sharpe",
    "asset_class",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", headline(result_obj));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |v, key| v.get(key))
        .filter(|v| !v.is_null())
}

fn headline(result: &Value) -> String {
    if let Some(v) = PRIORITY_PATHS.iter().find_map(|p| lookup(result, p)) {
        return format_value(v);
    }
    match result {
        Value::Object(map) => match map.iter().next() {
            Some((key, val)) => format!("{}: {}", key, format_value(val)),
            None => String::new(),
        },
        Value::Array(rows) => rows
            .iter()
            .map(|row| headline(row))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => format_value(result),
    }
}
