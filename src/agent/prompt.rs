use std::fmt::Write;

use crate::agent::input_types::{ConversationTurn, Settings};
use crate::agent::reply_parser::{
    ReplyFormat, CORRECT_ANSWER_PREFIX, FEEDBACK_PREFIX, PRONUNCIATION_PREFIX,
    SUGGESTIONS_PREFIX, TRANSLATION_PREFIX,
};

/// Only the trailing turns of a history are forwarded to the provider
pub const MAX_HISTORY_TURNS: usize = 10;

/// Message the front end sends to open a new roleplay
pub const INITIAL_MESSAGE_MARKER: &str = "START_CHAT";

/// Everything the system prompt is rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorContext {
    pub language: String,
    pub settings: Settings,
    /// Already trimmed to [`MAX_HISTORY_TURNS`]
    pub history: Vec<ConversationTurn>,
}

pub fn trim_history(history: &[ConversationTurn]) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    &history[start..]
}

pub fn is_initial_message(message: &str, history: &[ConversationTurn]) -> bool {
    history.is_empty() && message.contains(INITIAL_MESSAGE_MARKER)
}

/// Short recap appended to the prompt so the provider keeps its bearings.
pub fn conversation_state(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let last = history.last().map(ConversationTurn::content).unwrap_or_default();
    format!(
        "\n\nCURRENT CONVERSATION STATE:\n- Messages exchanged: {}\n- Last user message: {}\n",
        history.len(),
        last
    )
}

/// Render the system instructions for `format`.
///
/// The output section dictates exactly the prefixes or keys the reply parser
/// recognises for that format.
pub fn render_system_prompt(format: ReplyFormat, context: &TutorContext) -> String {
    let language = context.language.trim();
    let place = context.settings.place_or_default();
    let topic = context.settings.topic_or_default();

    let mut prompt = format!(
        "You are a friendly {language} language tutor and a conversation partner in an ongoing roleplay.\n\
         The roleplay takes place at {place}, and the lesson topic is: {topic}.\n\
         \n\
         ROLEPLAY RULES:\n\
         1. Keep the same character and scenario for the whole conversation.\n\
         2. Build on what was said earlier and react to the learner's last answer.\n\
         3. Remember which words, numbers and phrases were already practised.\n\
         4. Move the conversation forward one small step at a time.\n\
         5. Always end your message with a question so the learner can answer.\n\
         6. When the current exchange is finished, start a new one on the same topic.\n\
         \n"
    );

    match format {
        ReplyFormat::LineDelimited => prompt.push_str(&line_delimited_contract(language)),
        ReplyFormat::JsonObject => prompt.push_str(&json_object_contract(language)),
    }

    let complexity = context.settings.complexity;
    let _ = write!(
        prompt,
        "\n\
         LANGUAGE RULES:\n\
         1. Write the roleplay message in {language} only.\n\
         2. Stay strictly on the topic: {topic}.\n\
         3. Keep the same level of formality throughout.\n\
         4. Complexity is {complexity}/10: the higher it is, the longer and richer the message may be. \
         At complexity 0 use no more than four or five words.\n\
         5. Keep the language practical and conversational."
    );

    prompt.push_str(&conversation_state(&context.history));
    prompt
}

fn line_delimited_contract(language: &str) -> String {
    format!(
        "REPLY FORMAT (mandatory, one section per line, in this order):\n\
         1. Your next roleplay message in {language}.\n\
         2. \"{TRANSLATION_PREFIX}\" followed by the English translation of that message.\n\
         3. \"{PRONUNCIATION_PREFIX}\" followed by a pronunciation guide written for English speakers.\n\
         4. \"{FEEDBACK_PREFIX}\" followed by short, constructive feedback on the learner's previous answer. \
         Omit this line when the learner has not answered yet.\n\
         5. \"{CORRECT_ANSWER_PREFIX}\" followed by a corrected version of the learner's previous answer, \
         only when it contained a mistake.\n\
         6. \"{SUGGESTIONS_PREFIX}\" followed by a JSON array, on a single line, of exactly 3 possible learner answers. \
         Each element has a \"text\" string and an \"isCorrect\" boolean; exactly one is true.\n\
         \n\
         EXAMPLE:\n\
         Sehr gut! Möchten Sie noch etwas?\n\
         {TRANSLATION_PREFIX} Very good! Would you like anything else?\n\
         {PRONUNCIATION_PREFIX} ZEHR goot! MOOKH-ten zee NOKH et-vas?\n\
         {FEEDBACK_PREFIX} \"Ja, bitte\" was natural and polite.\n\
         {SUGGESTIONS_PREFIX} [{{\"text\": \"Nein, danke.\", \"isCorrect\": true}}, {{\"text\": \"Ich bin danke.\", \"isCorrect\": false}}, {{\"text\": \"Hallo gut.\", \"isCorrect\": false}}]\n\
         \n\
         Never skip the translation, pronunciation or suggestions lines.\n"
    )
}

fn json_object_contract(language: &str) -> String {
    format!(
        "REPLY FORMAT (mandatory): reply with exactly one JSON object and nothing else. \
         Do not use Markdown and do not wrap the object in a code block. \
         Quote every key with double quotes. The object has these keys:\n\
         - \"text\": your next roleplay message in {language}.\n\
         - \"translation\": the English translation of \"text\".\n\
         - \"pronunciation\": how \"text\" is pronounced, written for English speakers.\n\
         - \"suggestions\": an array of exactly 3 possible learner answers, each an object with a \"text\" string \
         and an \"isCorrect\" boolean; exactly one is true.\n\
         - \"feedback\": short, constructive feedback on the learner's previous answer. \
         Leave it out when the learner has not answered yet.\n\
         - \"correctAnswer\": a corrected version of the learner's previous answer, only when it contained a mistake.\n\
         \n\
         EXAMPLE:\n\
         {{\"text\": \"Wie viele Finger hast du?\", \"translation\": \"How many fingers do you have?\", \
         \"pronunciation\": \"Vee FEE-leh FING-er hast doo?\", \"suggestions\": [\
         {{\"text\": \"Ich liebe meinen Job.\", \"isCorrect\": false}}, \
         {{\"text\": \"Ich habe zehn Finger.\", \"isCorrect\": true}}, \
         {{\"text\": \"Ich habe einen Finger.\", \"isCorrect\": false}}]}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::reply_parser::parse_reply;

    fn context(history: Vec<ConversationTurn>) -> TutorContext {
        TutorContext {
            language: "German".to_string(),
            settings: Settings {
                place: "a bakery in Berlin".to_string(),
                topic: "ordering food".to_string(),
                complexity: 3,
            },
            history,
        }
    }

    /// Pull the example block out of a rendered prompt.
    fn example_block(prompt: &str) -> String {
        let start = prompt.find("EXAMPLE:\n").unwrap() + "EXAMPLE:\n".len();
        let rest = &prompt[start..];
        let end = rest.find("\n\n").unwrap_or(rest.len());
        rest[..end].to_string()
    }

    #[test]
    fn test_trim_history_keeps_trailing_turns() {
        let history: Vec<_> = (0..13).map(|i| ConversationTurn::user(format!("turn {}", i))).collect();
        let trimmed = trim_history(&history);
        assert_eq!(trimmed.len(), MAX_HISTORY_TURNS);
        assert_eq!(trimmed[0].content(), "turn 3");
        assert_eq!(trimmed[9].content(), "turn 12");

        let short = vec![ConversationTurn::user("only")];
        assert_eq!(trim_history(&short), &short[..]);
    }

    #[test]
    fn test_is_initial_message() {
        assert!(is_initial_message("START_CHAT", &[]));
        assert!(is_initial_message("please START_CHAT now", &[]));
        assert!(!is_initial_message("Hallo", &[]));
        assert!(!is_initial_message("START_CHAT", &[ConversationTurn::user("Hallo")]));
    }

    #[test]
    fn test_prompt_names_language_place_topic() {
        let prompt = render_system_prompt(ReplyFormat::LineDelimited, &context(vec![]));
        assert!(prompt.contains("German language tutor"));
        assert!(prompt.contains("a bakery in Berlin"));
        assert!(prompt.contains("ordering food"));
        assert!(prompt.contains("Complexity is 3/10"));
        assert!(!prompt.contains("CURRENT CONVERSATION STATE"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let ctx = context(vec![ConversationTurn::user("Hallo")]);
        assert_eq!(
            render_system_prompt(ReplyFormat::JsonObject, &ctx),
            render_system_prompt(ReplyFormat::JsonObject, &ctx)
        );
    }

    #[test]
    fn test_conversation_state_appended() {
        let ctx = context(vec![
            ConversationTurn::assistant("Was möchten Sie?"),
            ConversationTurn::user("Ein Brot, bitte."),
            ConversationTurn::assistant("Gerne!"),
        ]);
        let prompt = render_system_prompt(ReplyFormat::LineDelimited, &ctx);
        assert!(prompt.ends_with(
            "CURRENT CONVERSATION STATE:\n- Messages exchanged: 3\n- Last user message: Gerne!\n"
        ));
    }

    #[test]
    fn test_conversation_state_after_opening_turn() {
        let state = conversation_state(&[ConversationTurn::assistant("¡Hola! ¿Qué desea?")]);
        assert_eq!(
            state,
            "\n\nCURRENT CONVERSATION STATE:\n- Messages exchanged: 1\n- Last user message: ¡Hola! ¿Qué desea?\n"
        );
        assert_eq!(conversation_state(&[]), "");
    }

    #[test]
    fn test_line_example_round_trips_through_parser() {
        let prompt = render_system_prompt(ReplyFormat::LineDelimited, &context(vec![]));
        for prefix in [
            TRANSLATION_PREFIX,
            PRONUNCIATION_PREFIX,
            FEEDBACK_PREFIX,
            CORRECT_ANSWER_PREFIX,
            SUGGESTIONS_PREFIX,
        ] {
            assert!(prompt.contains(prefix), "missing {}", prefix);
        }

        let reply = parse_reply(ReplyFormat::LineDelimited, &example_block(&prompt), false).unwrap();
        assert_eq!(reply.text, "Sehr gut! Möchten Sie noch etwas?");
        assert!(reply.translation.is_some());
        assert!(reply.pronunciation.is_some());
        assert!(reply.feedback.is_some());
        assert_eq!(reply.suggestion_contract_violation(), None);
        assert_eq!(reply.suggestions.map(|s| s.len()), Some(3));
    }

    #[test]
    fn test_json_example_round_trips_through_parser() {
        let prompt = render_system_prompt(ReplyFormat::JsonObject, &context(vec![]));
        let reply = parse_reply(ReplyFormat::JsonObject, &example_block(&prompt), false).unwrap();
        assert_eq!(reply.text, "Wie viele Finger hast du?");
        assert!(reply.pronunciation.is_some());
        assert_eq!(reply.suggestion_contract_violation(), None);
    }
}
