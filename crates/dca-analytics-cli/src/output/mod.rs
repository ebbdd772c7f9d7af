pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields keyed by dotted path, plus every array of objects found
/// along the way (value paths, aligned series, forecasts).
#[derive(Debug, Default)]
pub struct Flattened {
    pub fields: Vec<(String, Value)>,
    pub series: Vec<(String, Vec<Value>)>,
}

pub fn flatten(map: &Map<String, Value>) -> Flattened {
    let mut out = Flattened::default();
    walk("", map, &mut out);
    out
}

fn walk(prefix: &str, map: &Map<String, Value>, out: &mut Flattened) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => walk(&path, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                out.series.push((path, items.clone()));
            }
            _ => out.fields.push((path, val.clone())),
        }
    }
}

/// Render a scalar cell; nested values fall back to compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers for a list of objects, in first-seen order.
pub fn headers(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}
