//! Built-in prompt definitions for the RAG pipeline stages.

use crate::types::PromptDefinition;

pub const DOMAIN_PROMPT_ID: &str = "rag.domain";
pub const REASON_PROMPT_ID: &str = "rag.reason";
pub const ANSWER_PROMPT_ID: &str = "rag.answer";
pub const REFLECT_PROMPT_ID: &str = "rag.reflect";

/// Every prompt id the pipeline renders.
pub const BUILTIN_PROMPT_IDS: [&str; 4] = [
    DOMAIN_PROMPT_ID,
    REASON_PROMPT_ID,
    ANSWER_PROMPT_ID,
    REFLECT_PROMPT_ID,
];

/// Sentence the answer stage must emit when the context lacks the answer.
pub const NOT_FOUND_SENTENCE: &str = "I could not find this information in the provided materials.";

const DOMAIN_SYSTEM: &str = "Determine whether the user's question belongs to the customer support FAQ domain.\n\
Valid topics include: billing, payments, account management, mobility, SIM/eSIM, roaming, \
TV service, internet/Wi-Fi, technical troubleshooting, device issues, moving services, \
and customer support contact info.\n\n\
If the question fits these topics, answer ONLY: in-domain\n\
Otherwise answer ONLY: out-of-domain";

const REASON_SYSTEM: &str = "Return ONLY 'sufficient' or 'insufficient'.";

const REFLECT_SYSTEM: &str = "Generate exactly TWO helpful follow-up questions based strictly on the answer and the context. \
Avoid unrelated topics. Return ONLY a JSON array of strings or objects.";

fn answer_system() -> String {
    format!(
        "You answer ONLY using the provided context. \
If answer is not contained in the context, reply EXACTLY:\n\"{}\"",
        NOT_FOUND_SENTENCE
    )
}

fn definition(id: &str, title: &str, system: String, template: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "builtin".to_string(),
        system: Some(system),
        template: template.to_string(),
    }
}

/// Built-in definition for `id`, if one exists.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    match id {
        DOMAIN_PROMPT_ID => Some(definition(
            id,
            "Domain guardrail",
            DOMAIN_SYSTEM.to_string(),
            "{{query}}",
        )),
        REASON_PROMPT_ID => Some(definition(
            id,
            "Context sufficiency",
            REASON_SYSTEM.to_string(),
            "Question:\n{{query}}\n\nContext:\n{{context}}",
        )),
        ANSWER_PROMPT_ID => Some(definition(
            id,
            "Grounded answer",
            answer_system(),
            "Context:\n{{context}}\n\nQuestion: {{query}}\n\nAnswer clearly:",
        )),
        REFLECT_PROMPT_ID => Some(definition(
            id,
            "Follow-up suggestions",
            REFLECT_SYSTEM.to_string(),
            "Original Question:\n{{query}}\n\nAnswer:\n{{answer}}\n\nContext:\n{{context}}",
        )),
        _ => None,
    }
}

/// All built-in definitions, in pipeline order.
pub fn builtin_prompts() -> Vec<PromptDefinition> {
    BUILTIN_PROMPT_IDS
        .iter()
        .filter_map(|id| builtin_prompt(id))
        .collect()
}
