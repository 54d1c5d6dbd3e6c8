use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stateless_llm_interface::{
    transport_error, upstream_status_error, CompletionRequest, StatelessLLMInterface,
};
use crate::agent::input_types::Role;
use crate::agent::reply_parser::ReplyFormat;
use crate::config_manager::OpenAICompatibleConfig;
use crate::error::{RelayError, Result};

const PROVIDER: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI compatible chat completions client.
/// Sends the system prompt as a leading `system` turn.
pub struct OpenAICompatibleLLM {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    organization_id: Option<String>,
    temperature: Option<f32>,
}

impl OpenAICompatibleLLM {
    pub fn new(config: &OpenAICompatibleConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            config.model, config.base_url
        );
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.model.clone(),
            organization_id: config.organization_id.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn reply_format(&self) -> ReplyFormat {
        ReplyFormat::LineDelimited
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(RelayError::Config("OpenAI API key is not set".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(RelayError::Config("OpenAI model is not set".to_string()));
        }

        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage {
            role: Role::System,
            content: &request.system,
        });
        messages.extend(request.history.iter().map(|turn| ChatMessage {
            role: turn.role(),
            content: turn.content(),
        }));
        messages.push(ChatMessage {
            role: Role::User,
            content: &request.message,
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending chat completion: model={}, turns={}", self.model, body.messages.len());

        let mut builder = self.client.post(&url).bearer_auth(&self.api_key).json(&body);
        if let Some(org) = &self.organization_id {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        if !status.is_success() {
            return Err(upstream_status_error(PROVIDER, status, &text));
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| RelayError::UpstreamParse {
                source_name: PROVIDER,
                reason: e.to_string(),
            })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(RelayError::EmptyResponse(PROVIDER))?;

        choice
            .message
            .content
            .ok_or_else(|| RelayError::UnexpectedReplyShape {
                provider: PROVIDER,
                reason: "first choice has no text content".to_string(),
            })
    }
}
