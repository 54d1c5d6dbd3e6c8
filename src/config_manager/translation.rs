use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the MyMemory translation relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    #[serde(rename = "base_url")]
    pub base_url: String,

    #[serde(rename = "timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transient failure
    #[serde(rename = "max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each following one
    #[serde(rename = "retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sent as `de`; MyMemory grants a larger daily quota to identified callers
    #[serde(rename = "contact_email")]
    pub contact_email: Option<String>,
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mymemory.translated.net/get".to_string(),
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 250,
            contact_email: None,
        }
    }
}
