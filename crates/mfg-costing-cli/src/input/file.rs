use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use mfg_costing_core::CostingError;

/// Input file encodings, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, CostingError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(InputFormat::Json),
            "yaml" | "yml" => Ok(InputFormat::Yaml),
            _ => Err(CostingError::UnknownFormat(path.display().to_string())),
        }
    }
}

/// Read a JSON or YAML file and deserialise into a typed struct.
pub fn read_input_file<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let format = InputFormat::from_path(&canonical)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    debug!(path = %canonical.display(), ?format, "reading input file");
    parse_contents(&contents, format).map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

pub fn parse_contents<T: DeserializeOwned>(contents: &str, format: InputFormat) -> Result<T, Box<dyn std::error::Error>> {
    let value = match format {
        InputFormat::Json => serde_json::from_str(contents)?,
        InputFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(value)
}

/// Resolve and validate the path, preventing directory traversal.
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
    use mfg_costing_core::breakeven::BreakEvenInput;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("run.json")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("run.YML")).unwrap(), InputFormat::Yaml);
        assert!(matches!(
            InputFormat::from_path(Path::new("run.txt")),
            Err(CostingError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_yaml_and_json_parse_alike() {
        let yaml = "fixed_costs: '10000'\nselling_price: '100'\nvariable_cost_per_unit: '60'\n";
        let json = r#"{"fixed_costs": "10000", "selling_price": "100", "variable_cost_per_unit": "60"}"#;
        let a: BreakEvenInput = parse_contents(yaml, InputFormat::Yaml).unwrap();
        let b: BreakEvenInput = parse_contents(json, InputFormat::Json).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.contribution_margin(), dec!(40));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_input_file::<BreakEvenInput>("/nonexistent/run.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
