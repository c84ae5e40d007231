//! Follow-up question generation.
//!
//! The model is asked for a JSON array but its reply is never trusted:
//! parsing walks an ordered fallback chain and always ends with exactly
//! two questions.

use crate::rag::completion::PromptRunner;
use helpdesk_core::AppResult;
use helpdesk_prompt::defaults::REFLECT_PROMPT_ID;
use serde_json::{Map, Value};

/// Generic questions used to pad short suggestion lists.
pub const FALLBACK_QUESTIONS: [&str; 2] = ["Can you explain more?", "What else should I know?"];

/// Object fields checked for question text, in priority order.
const QUESTION_FIELDS: [&str; 4] = ["question", "q", "follow_up", "text"];

/// Shape of a model reply after fence stripping.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSuggestions {
    StringList(Vec<String>),
    ObjectList(Vec<Map<String, Value>>),
    SingleObject(Map<String, Value>),
    /// Valid JSON of any other shape
    Unstructured(Value),
    /// Not JSON; cleaned reply text
    Lines(String),
}

impl ParsedSuggestions {
    /// Classify a cleaned reply.
    pub fn parse(cleaned: &str) -> Self {
        let value = match serde_json::from_str::<Value>(cleaned) {
            Ok(value) => value,
            Err(_) => return Self::Lines(cleaned.to_string()),
        };

        match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Self::StringList(
                items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => render(&other),
                    })
                    .collect(),
            ),
            Value::Array(items) if items.iter().all(Value::is_object) => Self::ObjectList(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(map) => Self::SingleObject(map),
            other => Self::Unstructured(other),
        }
    }

    /// Extract question strings.
    pub fn into_questions(self) -> Vec<String> {
        match self {
            Self::StringList(items) => items,
            Self::ObjectList(objects) => objects.iter().map(question_from_object).collect(),
            Self::SingleObject(object) => vec![question_from_object(&object)],
            Self::Unstructured(value) => vec![render(&value)],
            Self::Lines(text) => text
                .lines()
                .map(|line| {
                    line.trim()
                        .trim_start_matches(|c: char| c == '-' || c == '•' || c == '*' || c.is_whitespace())
                        .to_string()
                })
                .filter(|line| !line.is_empty() && !is_fence_line(line))
                .collect(),
        }
    }
}

/// A code fence (with or without a language tag) or a bare `json` tag.
fn is_fence_line(line: &str) -> bool {
    match line.strip_prefix("```") {
        Some(tag) => tag.chars().all(|c| c.is_ascii_alphanumeric()),
        None => line.eq_ignore_ascii_case("json"),
    }
}

/// String rendering of a JSON value; strings are rendered without quotes.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First present question field, else the whole object rendered.
fn question_from_object(object: &Map<String, Value>) -> String {
    QUESTION_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| is_present(value))
        .map(render)
        .unwrap_or_else(|| Value::Object(object.clone()).to_string())
}

/// Remove leading/trailing code fences and a bare leading language tag.
pub fn strip_fences(raw: &str) -> String {
    let mut text = raw.trim();

    for fence in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    for tag in ["json", "JSON"] {
        if let Some(rest) = text.strip_prefix(tag) {
            text = rest.trim_start();
            break;
        }
    }

    text.trim().to_string()
}

/// Pad with fallback questions, then truncate, to exactly two.
pub fn exactly_two(mut questions: Vec<String>) -> Vec<String> {
    for filler in FALLBACK_QUESTIONS {
        if questions.len() >= 2 {
            break;
        }
        questions.push(filler.to_string());
    }
    questions.truncate(2);
    questions
}

/// Full parse of a raw model reply into two questions.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    let parsed = ParsedSuggestions::parse(&strip_fences(raw));
    if let ParsedSuggestions::Lines(_) = parsed {
        tracing::warn!("Suggestion reply was not JSON, falling back to line parsing");
    }
    exactly_two(parsed.into_questions())
}

#[derive(Clone)]
pub struct SuggestionGenerator {
    runner: PromptRunner,
}

impl SuggestionGenerator {
    pub fn new(runner: PromptRunner) -> Self {
        Self { runner }
    }

    /// Exactly two questions, or none when there is no context.
    ///
    /// Malformed replies never fail; a completion error propagates.
    pub async fn suggest(&self, query: &str, answer: &str, context: &str) -> AppResult<Vec<String>> {
        if context.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self
            .runner
            .complete(
                REFLECT_PROMPT_ID,
                &[("query", query), ("answer", answer), ("context", context)],
                Vec::new(),
            )
            .await?;
        Ok(parse_suggestions(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_llm::MockLlmClient;
    use helpdesk_prompt::PromptLibrary;
    use std::sync::Arc;

    fn fallback() -> Vec<String> {
        FALLBACK_QUESTIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_string_array() {
        assert_eq!(
            parse_suggestions(r#"["How do I pay?", "When is it due?"]"#),
            vec!["How do I pay?", "When is it due?"]
        );
    }

    #[test]
    fn test_fenced_array_is_truncated() {
        let raw = "```json\n[\"One?\", \"Two?\", \"Three?\"]\n```";
        assert_eq!(parse_suggestions(raw), vec!["One?", "Two?"]);
    }

    #[test]
    fn test_bare_json_tag() {
        assert_eq!(
            parse_suggestions("json [\"A?\", \"B?\"]"),
            vec!["A?", "B?"]
        );
    }

    #[test]
    fn test_object_array_checks_fields_in_order() {
        let raw = r#"[
            {"q": "short?", "question": "preferred?"},
            {"follow_up": "follow?"},
            {"text": "text?"},
            {"other": 1}
        ]"#;
        let parsed = ParsedSuggestions::parse(raw);
        assert!(matches!(parsed, ParsedSuggestions::ObjectList(_)));
        assert_eq!(
            parsed.into_questions(),
            vec!["preferred?", "follow?", "text?", r#"{"other":1}"#]
        );
    }

    #[test]
    fn test_empty_field_falls_through() {
        let raw = r#"[{"question": "", "q": "fallback field?"}, {"question": null, "text": "t?"}]"#;
        assert_eq!(parse_suggestions(raw), vec!["fallback field?", "t?"]);
    }

    #[test]
    fn test_single_object_is_padded() {
        assert_eq!(
            parse_suggestions(r#"{"question": "Is roaming included?"}"#),
            vec!["Is roaming included?", FALLBACK_QUESTIONS[0]]
        );
    }

    #[test]
    fn test_unstructured_json_rendered() {
        assert_eq!(parse_suggestions("42"), vec!["42", FALLBACK_QUESTIONS[0]]);
        assert_eq!(
            parse_suggestions(r#"["mixed", 1]"#),
            vec![r#"["mixed",1]"#, FALLBACK_QUESTIONS[0]]
        );
    }

    #[test]
    fn test_line_fallback_strips_bullets() {
        let raw = "Here you go:\n- What is eSIM?\n• How do I activate it?\n";
        assert_eq!(
            parse_suggestions(raw),
            vec!["Here you go:", "What is eSIM?"]
        );

        let raw = "\n  - First question?\n\n* Second question?";
        assert_eq!(
            parse_suggestions(raw),
            vec!["First question?", "Second question?"]
        );
    }

    #[test]
    fn test_line_fallback_drops_fences_after_preamble() {
        let raw = "Here you go:\n```json\n[\"A?\", \"B?\"]\n```";
        let questions = parse_suggestions(raw);

        assert_eq!(questions, vec!["Here you go:", r#"["A?", "B?"]"#]);
        assert!(questions.iter().all(|q| !q.contains("```")));

        let raw = "Sure.\n```\nJSON\n- What is eSIM?";
        assert_eq!(parse_suggestions(raw), vec!["Sure.", "What is eSIM?"]);
    }

    #[test]
    fn test_degenerate_inputs_yield_fallback() {
        for raw in ["", "   ", "```", "```json\n```", "[]", "[{", "{\"question\":"] {
            let questions = parse_suggestions(raw);
            assert_eq!(questions.len(), 2, "input {:?}", raw);
        }
        assert_eq!(parse_suggestions(""), fallback());
        assert_eq!(parse_suggestions("[]"), fallback());
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```JSON\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("```\nplain\n```"), "plain");
        assert_eq!(strip_fences("  [\"a\"]  "), "[\"a\"]");
    }

    fn generator(mock: Arc<MockLlmClient>) -> SuggestionGenerator {
        SuggestionGenerator::new(PromptRunner::new(
            mock,
            Arc::new(PromptLibrary::builtin()),
            "m",
            0.2,
        ))
    }

    #[tokio::test]
    async fn test_empty_context_skips_model() {
        let mock = Arc::new(MockLlmClient::new().with_reply(REFLECT_PROMPT_ID, "[]"));
        let questions = generator(mock.clone()).suggest("q", "a", "").await.unwrap();

        assert!(questions.is_empty());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let mock = Arc::new(MockLlmClient::new().with_failure(REFLECT_PROMPT_ID, "timeout"));
        let result = generator(mock).suggest("q", "a", "ctx").await;

        assert!(matches!(result, Err(helpdesk_core::AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_prompt_carries_answer_and_context() {
        let mock = Arc::new(
            MockLlmClient::new().with_reply(REFLECT_PROMPT_ID, r#"["A?", "B?"]"#),
        );
        let questions = generator(mock.clone())
            .suggest("Reset modem?", "Unplug it.", "Unplug the modem for 30 seconds.")
            .await
            .unwrap();

        assert_eq!(questions, vec!["A?", "B?"]);
        let prompt = &mock.requests()[0].prompt;
        assert!(prompt.contains("Original Question:\nReset modem?"));
        assert!(prompt.contains("Answer:\nUnplug it."));
        assert!(prompt.contains("Context:\nUnplug the modem for 30 seconds."));
    }
}
