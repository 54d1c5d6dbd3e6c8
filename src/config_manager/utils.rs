use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

use crate::config_manager::main::Config;

/// Read a YAML or JSON/JSON-LD configuration file with environment variable substitution
pub fn read_config_file(config_path: &str) -> Result<Value> {
    let path = Path::new(config_path);
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read configuration file: {}", config_path))?;
    let content = decode_text(&bytes, config_path);
    let content = substitute_env_vars(&content, |name| std::env::var(name).ok());

    let lower = config_path.to_lowercase();
    let value = if lower.ends_with(".jsonld") || lower.ends_with(".json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", config_path))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", config_path))?
    };
    Ok(value)
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data)?;
    Ok(config)
}

/// Decode file bytes as UTF-8, honouring a byte order mark when present.
fn decode_text(bytes: &[u8], config_path: &str) -> String {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        warn!(
            "Configuration file {} contains invalid {} sequences; they were replaced",
            config_path,
            encoding.name()
        );
    }
    text.into_owned()
}

/// Replace `${VAR_NAME}` placeholders using `lookup`.
///
/// Unresolved placeholders become empty strings so a missing secret shows up as
/// an empty key instead of the literal placeholder text.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid");
    pattern
        .replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            lookup(name).unwrap_or_else(|| {
                warn!("Environment variable {} is not set", name);
                String::new()
            })
        })
        .into_owned()
}
