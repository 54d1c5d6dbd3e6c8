use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::input_types::ConversationTurn;
use crate::agent::prompt::{render_system_prompt, TutorContext};
use crate::agent::reply_parser::ReplyFormat;
use crate::error::{RelayError, Result};

/// One outbound completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Rendered system instructions
    pub system: String,
    /// Prior turns, already trimmed
    pub history: Vec<ConversationTurn>,
    /// The learner's new message
    pub message: String,
}

/// Interface for a stateless language model.
/// Stateless means the provider keeps no memory; callers resend history on every call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Human readable provider name used in errors and logs
    fn provider_name(&self) -> &'static str;

    /// Reply contract this provider is prompted with
    fn reply_format(&self) -> ReplyFormat;

    /// Render the system instructions for this provider's reply contract
    fn render(&self, context: &TutorContext) -> String {
        render_system_prompt(self.reply_format(), context)
    }

    /// Send one completion request and return the raw reply text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Error envelope shared by the OpenAI and Gemini APIs
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
    /// OpenAI calls it `type`, Gemini `status`
    #[serde(default, alias = "status")]
    r#type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Build an upstream error for a non-2xx reply, keeping the provider's own
/// message, type and code when the body carries them.
pub(crate) fn upstream_status_error(
    provider: &'static str,
    status: reqwest::StatusCode,
    body: &str,
) -> RelayError {
    let detail = match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(ProviderErrorBody { error }) if !error.message.is_empty() => {
            let kind = error.r#type.unwrap_or_default();
            let code = match error.code {
                Some(serde_json::Value::String(code)) => code,
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            format!("{} (type: {}, code: {})", error.message, kind, code)
        }
        _ => format!("request failed with status code {}", status.as_u16()),
    };

    RelayError::Upstream {
        provider,
        status: Some(status.as_u16()),
        detail,
    }
}

pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> RelayError {
    RelayError::Upstream {
        provider,
        status: None,
        detail: format!("failed to send request: {}", err),
    }
}
