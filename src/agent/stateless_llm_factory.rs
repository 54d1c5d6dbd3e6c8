use std::sync::Arc;
use tracing::info;

use crate::agent::stateless_llm::{GeminiLLM, OpenAICompatibleLLM, StatelessLLMInterface};
use crate::config_manager::{LLMProvider, StatelessLLMConfigs};
use crate::error::Result;

/// Factory for creating stateless LLM instances
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Create the LLM selected by `llm_provider` in the configuration.
    pub fn create_llm(config: &StatelessLLMConfigs) -> Result<Arc<dyn StatelessLLMInterface>> {
        info!("Initializing LLM: {:?}", config.llm_provider);

        match config.llm_provider {
            LLMProvider::OpenAICompatible => Ok(Arc::new(OpenAICompatibleLLM::new(
                &config.openai_compatible_llm,
                config.timeout(),
            )?)),
            LLMProvider::Gemini => Ok(Arc::new(GeminiLLM::new(
                &config.gemini_llm,
                config.timeout(),
            )?)),
        }
    }
}
