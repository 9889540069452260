use serde_json::Value;
use std::io::{self, Read};

/// Read a loan document piped on stdin.
///
/// Returns `None` when stdin is a terminal or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON when the document opens with `{` or `[`, YAML otherwise.
fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        serde_yaml::from_str(trimmed)
            .map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    tracing::debug!(bytes = trimmed.len(), "read input from stdin");
    Ok(Some(value))
}
