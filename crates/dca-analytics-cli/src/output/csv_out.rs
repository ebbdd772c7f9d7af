use serde_json::Value;
use std::io;

use super::{flatten, format_value, headers};

/// Series written as rows when a result carries one, in preference order.
const PRIMARY_SERIES: [&str; 4] = [
    "value_path",
    "comparison.aligned_series",
    "series",
    "historical",
];

/// Write output as CSV to stdout.
///
/// A result with a time series is written as that series, one row per date.
/// Anything else becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let flat = flatten(result);
            let primary = PRIMARY_SERIES
                .iter()
                .find_map(|name| flat.series.iter().find(|(k, _)| k.as_str() == *name));
            match primary {
                Some((_, rows)) => write_rows(&mut wtr, rows),
                None => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in &flat.fields {
                        let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                    }
                }
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let headers = headers(rows);
    if headers.is_empty() {
        for item in rows {
            let _ = wtr.write_record([&format_value(item)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
