use std::sync::Arc;

use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::agent::{StatelessLLMFactory, TutorAgent};
use crate::config_manager::Config;
use crate::error::Result;
use crate::translate::{MyMemoryTranslator, Translator};

/// Immutable per-process state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tutor: Arc<TutorAgent>,
    pub translator: Arc<dyn Translator>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let llm = StatelessLLMFactory::create_llm(&config.llm_config)?;
        let translator = Arc::new(MyMemoryTranslator::new(&config.translation_config)?);
        Ok(Self::from_parts(config, llm, translator))
    }

    pub fn from_parts(
        config: Config,
        llm: Arc<dyn StatelessLLMInterface>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tutor: Arc::new(TutorAgent::new(llm)),
            translator,
        }
    }
}
