//! Prompt builder for rendering templates with stage variables.

use crate::types::{BuiltPrompt, PromptDefinition};
use finstep_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// This function:
/// 1. Checks that every variable the definition declares was provided
/// 2. Renders the template using Handlebars with the provided variables
/// 3. Returns a `BuiltPrompt` ready for LLM execution
///
/// The variables are the only channel through which stage inputs reach the
/// instruction payload: the drafting prompt receives `context` and
/// `question`, the review prompt receives only `draft`.
///
/// # Example
/// ```no_run
/// use finstep_prompt::{build_prompt, load_prompt, LIBRARIAN_PROMPT_ID};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(Path::new("."), LIBRARIAN_PROMPT_ID)?;
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "ISAs shelter savings from tax.".to_string());
/// vars.insert("question".to_string(), "What is an ISA?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    // Every declared variable must be provided
    for required in &definition.variables {
        if !variables.contains_key(required) {
            return Err(AppError::Prompt(format!(
                "Missing variable '{}' for prompt '{}'",
                required, definition.id
            )));
        }
    }

    let rendered = render_template(&definition.template, &variables)?;

    let system = definition
        .system
        .clone()
        .filter(|s| !s.trim().is_empty());

    Ok(BuiltPrompt::new(
        system,
        rendered,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    // Register template
    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    // Render
    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_prompt, GUARDIAN_PROMPT_ID, LIBRARIAN_PROMPT_ID};
    use crate::types::{PromptBehavior, PromptOutputSpec};
    use std::path::Path;

    fn create_test_definition() -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                tone: "casual".to_string(),
                style: "structured".to_string(),
            },
            system: Some("You are a mentor".to_string()),
            variables: vec!["question".to_string()],
            template: "Question: {{question}}".to_string(),
            output: PromptOutputSpec {
                format: "markdown".to_string(),
            },
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_build_prompt_carries_system() {
        let def = create_test_definition();
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Test question".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Question: Test question");
        assert_eq!(built.system.as_deref(), Some("You are a mentor"));
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_missing_variable() {
        let def = create_test_definition();
        let vars = HashMap::new();

        let result = build_prompt(&def, vars);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing variable 'question'"));
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert(
            "question".to_string(),
            "Is 5% > 4% & <what about fees>?".to_string(),
        );

        let rendered = render_template("Q: {{question}}", &vars).unwrap();
        assert_eq!(rendered, "Q: Is 5% > 4% & <what about fees>?");
    }

    #[test]
    fn test_librarian_prompt_embeds_context_and_question() {
        let def = load_prompt(Path::new("."), LIBRARIAN_PROMPT_ID).unwrap();
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "ISA guide body text".to_string());
        vars.insert("question".to_string(), "Should I open an ISA?".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert!(built.user.contains("CONTEXT: ISA guide body text"));
        assert!(built.user.contains("QUESTION: Should I open an ISA?"));
        assert!(built.user.contains("The Short Answer"));
    }

    #[test]
    fn test_guardian_prompt_embeds_draft_only() {
        let def = load_prompt(Path::new("."), GUARDIAN_PROMPT_ID).unwrap();
        let mut vars = HashMap::new();
        vars.insert(
            "draft".to_string(),
            "**The Short Answer:** Yes! 🎉".to_string(),
        );

        let built = build_prompt(&def, vars).unwrap();
        assert!(built.user.contains("DRAFT ANSWER: **The Short Answer:** Yes! 🎉"));
        assert!(built.user.contains("NO DIRECT ADVICE"));
        assert!(built.user.contains("leave it alone"));
    }
}
