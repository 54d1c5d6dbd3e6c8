use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which generative-language provider answers chat requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LLMProvider {
    #[default]
    #[serde(rename = "openai_compatible_llm", alias = "openai_llm")]
    OpenAICompatible,
    #[serde(rename = "gemini_llm")]
    Gemini,
}

/// Configuration for OpenAI-compatible chat completion providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAICompatibleConfig {
    #[serde(rename = "base_url")]
    pub base_url: String,

    #[serde(rename = "llm_api_key")]
    pub llm_api_key: String,

    pub model: String,

    #[serde(rename = "organization_id")]
    pub organization_id: Option<String>,

    pub temperature: Option<f32>,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            llm_api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            organization_id: None,
            temperature: None,
        }
    }
}

/// Configuration for the Gemini generateContent API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(rename = "base_url")]
    pub base_url: String,

    #[serde(rename = "llm_api_key")]
    pub llm_api_key: String,

    pub model: String,

    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
        }
    }
}

/// Provider selection plus the settings for each provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatelessLLMConfigs {
    #[serde(rename = "llm_provider")]
    pub llm_provider: LLMProvider,

    #[serde(rename = "timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "openai_compatible_llm")]
    pub openai_compatible_llm: OpenAICompatibleConfig,

    #[serde(rename = "gemini_llm")]
    pub gemini_llm: GeminiConfig,
}

impl StatelessLLMConfigs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StatelessLLMConfigs {
    fn default() -> Self {
        Self {
            llm_provider: LLMProvider::default(),
            timeout_secs: 60,
            openai_compatible_llm: OpenAICompatibleConfig::default(),
            gemini_llm: GeminiConfig::default(),
        }
    }
}
