//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use helpdesk_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system instruction and the user template are rendered with
/// the same variables. Missing variables render as empty strings.
///
/// # Example
/// ```no_run
/// use helpdesk_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "How do I activate my eSIM?".to_string());
///
/// let built = build_prompt(&def, &vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, variables))
        .transpose()?;
    let user = render_template(&definition.template, variables)?;

    Ok(BuiltPrompt {
        system,
        user,
        source_prompt_id: definition.id.clone(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Retrieved passages are plain text; never HTML-escape them
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{builtin_prompt, ANSWER_PROMPT_ID, REASON_PROMPT_ID};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{query}}", &vars(&[("query", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{context}}", &vars(&[("context", "<b>9am & 9pm</b>")]));
        assert_eq!(result.unwrap(), "<b>9am & 9pm</b>");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert_eq!(result.unwrap(), "Question: ");
    }

    #[test]
    fn test_render_invalid_template() {
        let result = render_template("{{#if}}", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_answer_prompt() {
        let def = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        let built = build_prompt(
            &def,
            &vars(&[
                ("query", "What are Wi-Fi support hours?"),
                ("context", "Wi-Fi support hours are 9am-9pm"),
            ]),
        )
        .unwrap();

        assert_eq!(
            built.user,
            "Context:\nWi-Fi support hours are 9am-9pm\n\nQuestion: What are Wi-Fi support hours?\n\nAnswer clearly:"
        );
        assert_eq!(built.source_prompt_id, ANSWER_PROMPT_ID);
        assert!(built.system.is_some());
    }

    #[test]
    fn test_build_without_system() {
        let mut def = builtin_prompt(REASON_PROMPT_ID).unwrap();
        def.system = None;

        let built = build_prompt(&def, &vars(&[("query", "q"), ("context", "c")])).unwrap();
        assert_eq!(built.system, None);
        assert_eq!(built.user, "Question:\nq\n\nContext:\nc");
    }
}
