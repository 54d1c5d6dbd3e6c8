use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::input_types::ChatRequest;
use crate::agent::output_types::LearnerReply;
use crate::agent::prompt::{is_initial_message, trim_history, TutorContext};
use crate::agent::reply_parser::parse_reply;
use crate::agent::stateless_llm::{CompletionRequest, StatelessLLMInterface};
use crate::error::Result;

/// Turns one learner message into one canonical tutor reply.
///
/// Holds no conversation memory: the caller resubmits the history with every
/// request and only its trailing turns are forwarded.
pub struct TutorAgent {
    llm: Arc<dyn StatelessLLMInterface>,
}

impl TutorAgent {
    pub fn new(llm: Arc<dyn StatelessLLMInterface>) -> Self {
        info!("TutorAgent initialized with {}", llm.provider_name());
        Self { llm }
    }

    pub async fn respond(&self, request: ChatRequest) -> Result<LearnerReply> {
        request.validate()?;

        let initial = is_initial_message(&request.message, &request.history);
        let history = trim_history(&request.history).to_vec();
        if history.len() < request.history.len() {
            debug!(
                "Dropped {} older turns from history",
                request.history.len() - history.len()
            );
        }

        let context = TutorContext {
            language: request.language,
            settings: request.settings,
            history,
        };
        let system = self.llm.render(&context);

        let raw = self
            .llm
            .complete(CompletionRequest {
                system,
                history: context.history,
                message: request.message,
            })
            .await?;
        debug!("{} replied with {} bytes", self.llm.provider_name(), raw.len());

        parse_reply(self.llm.reply_format(), &raw, initial)
    }
}
