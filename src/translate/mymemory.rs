use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::interface::{TranslateRequest, TranslateResponse, Translator};
use crate::config_manager::TranslationConfig;
use crate::error::{RelayError, Result};

const SERVICE: &str = "Translation service";

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Outcome of a single attempt that did not produce a translation
enum AttemptError {
    Transient(RelayError),
    Fatal(RelayError),
}

/// Client for the MyMemory `get` endpoint
pub struct MyMemoryTranslator {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
    contact_email: Option<String>,
}

impl MyMemoryTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized MyMemoryTranslator: base_url={}, max_retries={}",
            config.base_url, config.max_retries
        );
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
            contact_email: config.contact_email.clone(),
        })
    }

    async fn attempt(&self, request: &TranslateRequest) -> std::result::Result<String, AttemptError> {
        let langpair = format!("{}|{}", request.source_lang.trim(), request.target_lang.trim());
        let mut query = vec![("q", request.text.as_str()), ("langpair", langpair.as_str())];
        if let Some(email) = &self.contact_email {
            query.push(("de", email.as_str()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let error = RelayError::ServiceUnavailable {
                    service: SERVICE,
                    reason: e.to_string(),
                };
                if e.is_timeout() || e.is_connect() {
                    AttemptError::Transient(error)
                } else {
                    AttemptError::Fatal(error)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = RelayError::ServiceUnavailable {
                service: SERVICE,
                reason: format!("HTTP {}", status.as_u16()),
            };
            return Err(if is_transient_status(status) {
                AttemptError::Transient(error)
            } else {
                AttemptError::Fatal(error)
            });
        }

        let body = response.text().await.map_err(|e| {
            AttemptError::Transient(RelayError::ServiceUnavailable {
                service: SERVICE,
                reason: format!("failed to read response: {}", e),
            })
        })?;

        let parsed: MyMemoryResponse = serde_json::from_str(&body).map_err(|e| {
            AttemptError::Fatal(RelayError::UpstreamParse {
                source_name: "translation",
                reason: e.to_string(),
            })
        })?;

        match parsed.response_data.and_then(|data| data.translated_text) {
            Some(text) => Ok(text),
            None => {
                warn!(
                    target: "contract_drift",
                    "Translation response has no responseData.translatedText; returning empty text"
                );
                Ok(String::new())
            }
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// `base` doubled once per earlier retry, saturating instead of overflowing.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse> {
        request.validate()?;

        let mut attempt = 0;
        loop {
            match self.attempt(&request).await {
                Ok(translated_text) => {
                    debug!(
                        "Translated {} chars {}->{}",
                        request.text.chars().count(),
                        request.source_lang,
                        request.target_lang
                    );
                    return Ok(TranslateResponse { translated_text });
                }
                Err(AttemptError::Transient(e)) if attempt < self.max_retries => {
                    let delay = retry_delay(self.retry_backoff, attempt);
                    warn!("Translation attempt {} failed: {}; retrying in {:?}", attempt + 1, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(AttemptError::Transient(e)) | Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }
    }
}
