use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stateless_llm_interface::{
    transport_error, upstream_status_error, CompletionRequest, StatelessLLMInterface,
};
use crate::agent::input_types::Role;
use crate::agent::reply_parser::{strip_code_fences, ReplyFormat};
use crate::config_manager::GeminiConfig;
use crate::error::{RelayError, Result};

const PROVIDER: &str = "Gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini has no system role: the prompt opens the history as a `user` turn.
fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::System | Role::User => "user",
    }
}

/// Google Gemini `generateContent` client
pub struct GeminiLLM {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiLLM {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized GeminiLLM: model={}, base_url={}",
            config.model, config.base_url
        );
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn reply_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(RelayError::EmptyResponse(PROVIDER))?;

        let content = candidate.content.ok_or_else(|| RelayError::UnexpectedReplyShape {
            provider: PROVIDER,
            reason: format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        })?;

        let mut output = String::new();
        for (index, part) in content.parts.into_iter().enumerate() {
            match part.text {
                Some(text) => output.push_str(&text),
                None => {
                    return Err(RelayError::UnexpectedReplyShape {
                        provider: PROVIDER,
                        reason: format!("part {} is not plain text", index),
                    })
                }
            }
        }
        Ok(output)
    }
}

#[async_trait]
impl StatelessLLMInterface for GeminiLLM {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn reply_format(&self) -> ReplyFormat {
        ReplyFormat::JsonObject
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(RelayError::Config("Gemini API key is not set".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(RelayError::Config("Gemini model is not set".to_string()));
        }

        let mut contents = Vec::with_capacity(request.history.len() + 2);
        contents.push(Content {
            role: "user",
            parts: [Part {
                text: &request.system,
            }],
        });
        contents.extend(request.history.iter().map(|turn| Content {
            role: gemini_role(turn.role()),
            parts: [Part {
                text: turn.content(),
            }],
        }));
        contents.push(Content {
            role: "user",
            parts: [Part {
                text: &request.message,
            }],
        });

        let body = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!("Sending generateContent: model={}, turns={}", self.model, body.contents.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
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

        let generated: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| RelayError::UpstreamParse {
                source_name: PROVIDER,
                reason: e.to_string(),
            })?;

        let output = Self::reply_text(generated)?;
        Ok(strip_code_fences(&output).to_string())
    }
}
