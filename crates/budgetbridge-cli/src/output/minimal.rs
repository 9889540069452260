use serde_json::Value;

/// Headline figures, most specific first.
const PRIORITY_KEYS: [&str; 4] = [
    "scheduled_payment",
    "total_interest_paid",
    "base_total_interest",
    "real_ending_balance",
];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the result object; for a record array the
/// last record is used (the final period of a balance path).
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", minimal_answer(result_obj));
}

fn minimal_answer(result: &Value) -> String {
    let target = match result {
        Value::Array(arr) => arr.last().unwrap_or(result),
        other => other,
    };

    if let Value::Object(map) = target {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(target)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
