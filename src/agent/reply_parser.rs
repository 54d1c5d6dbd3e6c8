use tracing::warn;

use crate::agent::output_types::{LearnerReply, Suggestion};
use crate::error::{RelayError, Result};

pub const TRANSLATION_PREFIX: &str = "Translation:";
pub const PRONUNCIATION_PREFIX: &str = "Pronunciation:";
pub const SUGGESTIONS_PREFIX: &str = "Suggestions:";
pub const FEEDBACK_PREFIX: &str = "Feedback:";
pub const CORRECT_ANSWER_PREFIX: &str = "Correct Answer:";

/// Serialization contract a provider is instructed to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    /// Roleplay text followed by `Prefix: value` lines
    LineDelimited,
    /// A single JSON object with the `LearnerReply` keys
    JsonObject,
}

/// Map a raw provider reply onto the canonical schema.
///
/// `initial` marks the opening turn of a conversation, for which feedback and
/// the correct answer are always discarded.
pub fn parse_reply(format: ReplyFormat, raw: &str, initial: bool) -> Result<LearnerReply> {
    let reply = match format {
        ReplyFormat::LineDelimited => parse_line_delimited(raw),
        ReplyFormat::JsonObject => parse_json_object(raw)?,
    };

    if let Some(violation) = reply.suggestion_contract_violation() {
        warn!(target: "contract_drift", "Provider suggestions off contract: {}", violation);
    }

    Ok(if initial {
        reply.without_assessment()
    } else {
        reply
    })
}

fn parse_line_delimited(raw: &str) -> LearnerReply {
    let mut reply = LearnerReply::default();
    let mut main_text = Vec::new();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(rest) = line.strip_prefix(TRANSLATION_PREFIX) {
            reply.translation = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(PRONUNCIATION_PREFIX) {
            reply.pronunciation = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(SUGGESTIONS_PREFIX) {
            match serde_json::from_str::<Vec<Suggestion>>(rest.trim()) {
                Ok(suggestions) => reply.suggestions = Some(suggestions),
                Err(e) => {
                    warn!(target: "contract_drift", "Failed to parse suggestions: {}", e);
                }
            }
        } else if let Some(rest) = line.strip_prefix(FEEDBACK_PREFIX) {
            reply.feedback = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(CORRECT_ANSWER_PREFIX) {
            reply.correct_answer = Some(rest.to_string());
        } else {
            main_text.push(line);
        }
    }

    reply.text = main_text.join("\n");
    reply.normalized()
}

fn parse_json_object(raw: &str) -> Result<LearnerReply> {
    let body = strip_code_fences(raw);
    let reply: LearnerReply =
        serde_json::from_str(body).map_err(|e| RelayError::UpstreamParse {
            source_name: "provider",
            reason: format!("reply is not the expected JSON object: {}", e),
        })?;
    Ok(reply.normalized())
}

/// Remove a Markdown code fence (optionally tagged `json`) wrapped around a reply.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"Sehr gut! Möchten Sie noch etwas?
Translation: Very good! Would you like anything else?
Pronunciation: ZEHR goot! MOCH-ten zee NOCH et-vas?
Feedback: Nice use of "Ja, bitte".
Correct Answer: Ja, bitte.
Suggestions: [{"text":"Nein, danke.","isCorrect":true},{"text":"Ich bin.","isCorrect":false},{"text":"Hallo gut.","isCorrect":false}]"#;

    #[test]
    fn test_line_delimited_all_fields() {
        let reply = parse_reply(ReplyFormat::LineDelimited, FULL_REPLY, false).unwrap();
        assert_eq!(reply.text, "Sehr gut! Möchten Sie noch etwas?");
        assert_eq!(
            reply.translation.as_deref(),
            Some("Very good! Would you like anything else?")
        );
        assert_eq!(
            reply.pronunciation.as_deref(),
            Some("ZEHR goot! MOCH-ten zee NOCH et-vas?")
        );
        assert_eq!(reply.feedback.as_deref(), Some("Nice use of \"Ja, bitte\"."));
        assert_eq!(reply.correct_answer.as_deref(), Some("Ja, bitte."));

        let suggestions = reply.suggestions.unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions.iter().filter(|s| s.is_correct).count(), 1);
        assert_eq!(suggestions[0], Suggestion::new("Nein, danke.", true));
    }

    #[test]
    fn test_unprefixed_reply_becomes_text() {
        let raw = "  Hallo!  \n\n   Wie geht's?\n";
        let reply = parse_reply(ReplyFormat::LineDelimited, raw, false).unwrap();
        assert_eq!(
            reply,
            LearnerReply {
                text: "Hallo!\nWie geht's?".to_string(),
                ..LearnerReply::default()
            }
        );
    }

    #[test]
    fn test_malformed_suggestions_are_dropped() {
        let raw = "Hallo!\nTranslation: Hello!\nSuggestions: [{\"text\": \"Hi\", isCorrect: true}";
        let reply = parse_reply(ReplyFormat::LineDelimited, raw, false).unwrap();
        assert_eq!(reply.text, "Hallo!");
        assert_eq!(reply.translation.as_deref(), Some("Hello!"));
        assert!(reply.suggestions.is_none());
    }

    #[test]
    fn test_initial_message_discards_assessment() {
        let reply = parse_reply(ReplyFormat::LineDelimited, FULL_REPLY, true).unwrap();
        assert!(reply.feedback.is_none());
        assert!(reply.correct_answer.is_none());
        assert!(reply.translation.is_some());
    }

    #[test]
    fn test_json_object_reply() {
        let raw = r#"{
            "text": "Wie viele Finger hast du?",
            "translation": "How many fingers do you have?",
            "pronunciation": "Vee fee-leh fing-er hast doo?",
            "suggestions": [
                {"text": "Ich liebe meinen Job", "isCorrect": "false"},
                {"text": "Ich habe zehn Finger", "isCorrect": "true"},
                {"text": "Ich habe einen Finger", "isCorrect": false}
            ],
            "feedback": "",
            "correctAnswer": null
        }"#;
        let reply = parse_reply(ReplyFormat::JsonObject, raw, false).unwrap();
        assert_eq!(reply.text, "Wie viele Finger hast du?");
        assert_eq!(reply.feedback, None);
        assert_eq!(reply.correct_answer, None);
        let suggestions = reply.suggestions.unwrap();
        assert_eq!(suggestions[1], Suggestion::new("Ich habe zehn Finger", true));
    }

    #[test]
    fn test_fenced_json_matches_unfenced() {
        let plain = r#"{"text": "Hallo", "translation": "Hello", "feedback": "Gut gemacht"}"#;
        let fenced = format!("```json\n{}\n```", plain);
        let bare_fence = format!("```\n{}\n```\n", plain);

        let expected = parse_reply(ReplyFormat::JsonObject, plain, false).unwrap();
        assert_eq!(parse_reply(ReplyFormat::JsonObject, &fenced, false).unwrap(), expected);
        assert_eq!(parse_reply(ReplyFormat::JsonObject, &bare_fence, false).unwrap(), expected);
        assert_eq!(expected.feedback.as_deref(), Some("Gut gemacht"));

        let initial = parse_reply(ReplyFormat::JsonObject, &fenced, true).unwrap();
        assert!(initial.feedback.is_none());
    }

    #[test]
    fn test_json_object_decode_failure() {
        let err = parse_reply(ReplyFormat::JsonObject, "Sorry, I cannot help.", false).unwrap_err();
        assert!(matches!(err, RelayError::UpstreamParse { .. }));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("{\"note\": \"json\"}"), "{\"note\": \"json\"}");
    }
}
