use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML file (chosen by extension) into a typed struct.
pub fn read_input<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    tracing::debug!(path = %canonical.display(), "read input file");
    parse_input(&canonical, &contents)
}

fn parse_input<T: DeserializeOwned>(
    path: &Path,
    contents: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );

    let value: T = if is_yaml {
        serde_yaml::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    } else {
        serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    };
    Ok(value)
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetbridge_core::{LoanInput, PaymentFrequency};
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_yaml_loan() {
        let yaml = "principal_requested: 250000\n\
                    deposit: 25000\n\
                    annual_interest_rate: 7.5\n\
                    duration_years: 20\n\
                    frequency: quarterly\n";
        let input: LoanInput = parse_input(Path::new("loan.yaml"), yaml).unwrap();
        assert_eq!(input.principal_requested, dec!(250000));
        assert_eq!(input.frequency, PaymentFrequency::Quarterly);
        assert_eq!(input.duration_years, Some(20));
    }

    #[test]
    fn test_parse_json_loan() {
        let json = r#"{"principal_requested": "10000", "annual_interest_rate": "12", "duration_periods": 12}"#;
        let input: LoanInput = parse_input(Path::new("loan.json"), json).unwrap();
        assert_eq!(input.duration_periods, Some(12));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_input::<LoanInput>(Path::new("bad.json"), "{").unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_input::<LoanInput>("/definitely/not/here.json").is_err());
    }
}
