use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use mfg_costing_core::Currency;

use crate::OutputFormat;

/// Optional defaults read from a TOML file. Command-line flags win.
///
/// ```toml
/// currency = "USD"
/// output = "table"
/// custom_target_profit_pct = "35"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
    /// Extra target profit added to every break-even sweep
    #[serde(default)]
    pub custom_target_profit_pct: Option<Decimal>,
}

/// Load the config file at `path`. A missing file yields the defaults.
pub fn load_config(path: Option<&str>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let p = Path::new(path);
    if !p.exists() {
        debug!(path, "config file not found; using defaults");
        return Ok(CliConfig::default());
    }

    let contents = fs::read_to_string(p).map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
    let cfg = parse_config(&contents).map_err(|e| format!("Failed to parse config '{}': {}", path, e))?;
    info!(path, "config loaded");
    Ok(cfg)
}

pub fn parse_config(contents: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// `--currency` / `COSTING_CURRENCY` first, then the config file, then INR.
pub fn resolve_currency(flag: Option<&str>, cfg: &CliConfig) -> Currency {
    match flag {
        Some(code) if !code.trim().is_empty() => Currency::from(code.to_string()),
        _ => cfg.currency.clone().unwrap_or_default(),
    }
}
