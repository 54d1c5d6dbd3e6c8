use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Body of `POST /api/translate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslateRequest {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("text", &self.text),
            ("sourceLang", &self.source_lang),
            ("targetLang", &self.target_lang),
        ] {
            if value.trim().is_empty() {
                return Err(RelayError::InvalidArgument(format!("`{}` is required", name)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// Translation provider interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse>;
}
