use serde::{Deserialize, Deserializer, Serialize};

/// A candidate answer offered to the learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    /// Canonically a boolean; `"true"`/`"false"` strings are normalized
    #[serde(deserialize_with = "bool_or_string")]
    pub is_correct: bool,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// Canonical tutor reply returned by `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerReply {
    /// Roleplay message in the target language
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Suggestion>>,
    /// Never present on the opening turn of a conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Number of suggestions every reply is expected to carry
pub const SUGGESTION_COUNT: usize = 3;

impl LearnerReply {
    /// Treat blank optional fields as absent and trim the rest.
    pub fn normalized(mut self) -> Self {
        self.text = self.text.trim().to_string();
        for field in [
            &mut self.translation,
            &mut self.pronunciation,
            &mut self.feedback,
            &mut self.correct_answer,
        ] {
            *field = field
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
        self
    }

    /// Drop the fields that only make sense once the learner has answered.
    pub fn without_assessment(mut self) -> Self {
        self.feedback = None;
        self.correct_answer = None;
        self
    }

    /// Describe how the suggestions deviate from "three options, one correct", if they do.
    pub fn suggestion_contract_violation(&self) -> Option<String> {
        let suggestions = self.suggestions.as_ref()?;
        let correct = suggestions.iter().filter(|s| s.is_correct).count();
        if suggestions.len() != SUGGESTION_COUNT || correct != 1 {
            Some(format!(
                "expected {} suggestions with exactly one correct, got {} with {} correct",
                SUGGESTION_COUNT,
                suggestions.len(),
                correct
            ))
        } else {
            None
        }
    }
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(D::Error::custom(format!("invalid isCorrect value `{}`", other))),
        },
    }
}
