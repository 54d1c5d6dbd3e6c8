use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config_manager::stateless_llm::StatelessLLMConfigs;
use crate::config_manager::system::SystemConfig;
use crate::config_manager::translation::TranslationConfig;

/// Main configuration for the application, read once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    #[serde(rename = "system_config")]
    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(rename = "llm_config")]
    #[serde(default)]
    pub llm_config: StatelessLLMConfigs,

    #[serde(rename = "translation_config")]
    #[serde(default)]
    pub translation_config: TranslationConfig,
}

impl Config {
    /// Load configuration from a YAML or JSON-LD file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        use crate::config_manager::utils::{read_config_file, validate_config};
        let json_value = read_config_file(path)?;
        validate_config(json_value)
    }

    /// Try the known locations in order and return the first config that loads.
    pub fn discover() -> anyhow::Result<(Self, String)> {
        let candidates = Self::candidate_paths();
        for path in &candidates {
            match Self::load(path) {
                Ok(config) => return Ok((config, path.clone())),
                Err(e) => debug!("Failed to load config from {}: {:#}", path, e),
            }
        }
        anyhow::bail!("Could not find config file. Tried: {:?}", candidates)
    }

    fn candidate_paths() -> Vec<String> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        [
            std::env::var("CONFIG_PATH").ok(),
            Some("conf.yaml".to_string()),
            Some("conf.jsonld".to_string()),
            exe_dir.join("conf.yaml").to_str().map(str::to_string),
            exe_dir.join("conf.jsonld").to_str().map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
