pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Array fields that hold the per-period or per-rate records of a result.
pub(crate) const RECORD_KEYS: [&str; 2] = ["rows", "points"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The record array inside a result: the result itself when it is an array,
/// otherwise its `rows` or `points` field.
pub(crate) fn records(result: &Value) -> Option<&[Value]> {
    match result {
        Value::Array(arr) => Some(arr),
        Value::Object(map) => RECORD_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice),
        _ => None,
    }
}
