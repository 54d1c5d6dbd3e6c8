use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RelayError, Result};

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    /// Gemini names this role `model`
    #[serde(alias = "model")]
    Assistant,
}

/// One message of a conversation history.
///
/// Accepts both `{role, content}` and the Gemini-style `{role, parts: [..]}`
/// shape on input; always serializes as `{role, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTurn")]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Deserialize)]
struct RawTurn {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, alias = "Parts")]
    parts: Option<Vec<String>>,
}

impl TryFrom<RawTurn> for ConversationTurn {
    type Error = String;

    fn try_from(raw: RawTurn) -> std::result::Result<Self, Self::Error> {
        let content = match (raw.content, raw.parts) {
            (Some(content), _) => content,
            (None, Some(parts)) => parts.join("\n"),
            (None, None) => return Err("history turn needs `content` or `parts`".to_string()),
        };
        Ok(Self::new(raw.role, content))
    }
}

/// Roleplay settings chosen by the learner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "null_as_default")]
    pub place: String,
    #[serde(deserialize_with = "null_as_default")]
    pub topic: String,
    /// 0 (a handful of words) to 10
    #[serde(deserialize_with = "deserialize_complexity")]
    pub complexity: u8,
}

pub const MAX_COMPLEXITY: u8 = 10;

impl Settings {
    pub fn place_or_default(&self) -> &str {
        non_blank_or(&self.place, "an unspecified place")
    }

    pub fn topic_or_default(&self) -> &str {
        non_blank_or(&self.topic, "everyday conversation")
    }
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub settings: Settings,
    #[serde(deserialize_with = "null_as_default")]
    pub history: Vec<ConversationTurn>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(RelayError::InvalidArgument("`message` is required".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(RelayError::InvalidArgument("`language` is required".to_string()));
        }
        Ok(())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Front ends send complexity from a range slider, so fractional values and
/// numeric strings are accepted, rounded, and clamped to `0..=10`.
fn deserialize_complexity<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        None | Some(serde_json::Value::Null) => return Ok(0),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("complexity is not a finite number"))?,
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("complexity `{}` is not a number", s)))?,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "complexity must be a number, got {}",
                other
            )))
        }
    };

    if !number.is_finite() {
        return Err(D::Error::custom("complexity is not a finite number"));
    }
    Ok(number.round().clamp(0.0, f64::from(MAX_COMPLEXITY)) as u8)
}
